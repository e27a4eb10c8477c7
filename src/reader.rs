//! The two readers applied to every previewed file.
//!
//! [`TablePreview`] loads rows through DataFusion and keeps only the first
//! few, with the index column moved to the front. [`SchemaSummary`] reads the
//! Parquet footer with the `parquet` crate and never touches row data. The two
//! are independent: each opens the file on its own.

use std::{fs::File, io::Write, path::Path, sync::Arc};

use anyhow::{Result, anyhow, bail};
use arrow::{
    array::RecordBatch,
    datatypes::{DataType, SchemaRef},
    util::pretty::pretty_format_batches,
};
use datafusion::prelude::{ParquetReadOptions, SessionContext};
use parquet::{
    arrow::parquet_to_arrow_schema,
    file::reader::{FileReader, SerializedFileReader},
};
use tracing::debug;
use url::Url;

use crate::config::PreviewConfig;

/// Name printed in the banner of the row preview.
pub const PREVIEW_READER: &str = "datafusion";

/// Name printed in the banner of the schema listing.
pub const SCHEMA_READER: &str = "parquet";

/// First rows of a file, index column first.
#[derive(Debug)]
pub struct TablePreview {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl TablePreview {
    pub async fn load(path: &str, config: &PreviewConfig) -> Result<Self> {
        let ctx = SessionContext::new();
        // entries are not filtered by extension, so don't let the listing filter them either
        let options = ParquetReadOptions {
            file_extension: "",
            ..Default::default()
        };
        let df = ctx.read_parquet(file_url(path)?.as_str(), options).await?;

        let index = config.index_column.as_str();
        if !df.schema().has_column_with_unqualified_name(index) {
            bail!("Column '{}' not found in {}", index, path);
        }

        let columns: Vec<String> = std::iter::once(index.to_string())
            .chain(
                df.schema()
                    .fields()
                    .iter()
                    .map(|f| f.name().clone())
                    .filter(|name| name != index),
            )
            .collect();
        let column_refs: Vec<&str> = columns.iter().map(String::as_str).collect();

        let df = df
            .select_columns(&column_refs)?
            .limit(0, Some(config.preview_rows))?;
        let schema: SchemaRef = Arc::new(df.schema().as_arrow().clone());
        let mut batches: Vec<RecordBatch> = df
            .collect()
            .await?
            .into_iter()
            .filter(|b| b.num_rows() > 0)
            .collect();

        // keep the header visible for empty files
        if batches.is_empty() {
            batches.push(RecordBatch::new_empty(Arc::clone(&schema)));
        }

        let preview = Self { schema, batches };
        debug!(path, rows = preview.num_rows(), "loaded preview");
        Ok(preview)
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Render the rows as a bordered text table.
    pub fn render(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", pretty_format_batches(&self.batches)?)?;
        Ok(())
    }
}

/// Column names and types read from the Parquet footer.
#[derive(Debug)]
pub struct SchemaSummary {
    schema: SchemaRef,
}

impl SchemaSummary {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let file_metadata = reader.metadata().file_metadata();

        let schema = parquet_to_arrow_schema(
            file_metadata.schema_descr(),
            file_metadata.key_value_metadata(),
        )?;

        debug!(
            path = %path.display(),
            columns = schema.fields().len(),
            rows = file_metadata.num_rows(),
            "loaded schema"
        );

        Ok(Self {
            schema: schema.into(),
        })
    }

    /// One `name: type` line per column, in file order.
    pub fn render(&self, out: &mut dyn Write) -> Result<()> {
        for field in self.schema.fields() {
            let nullability = if field.is_nullable() { "" } else { " not null" };
            writeln!(
                out,
                "{}: {}{}",
                field.name(),
                format_data_type(field.data_type()),
                nullability
            )?;
        }
        Ok(())
    }
}

/// `file://` URL for a local path.
///
/// DataFusion reads `*`, `?` and `[` in a plain path as a glob; a URL is
/// always taken as one literal object.
fn file_url(path: &str) -> Result<Url> {
    let absolute = std::path::absolute(path)?;
    Url::from_file_path(&absolute)
        .map_err(|()| anyhow!("Failed to convert path to URL: {}", absolute.display()))
}

fn format_data_type(data_type: &DataType) -> String {
    match data_type {
        DataType::List(field) => format!("List<{}>", format_data_type(field.data_type())),
        DataType::LargeList(field) => format!("LargeList<{}>", format_data_type(field.data_type())),
        DataType::Struct(fields) => {
            let inner = fields
                .iter()
                .map(|f| format!("{}: {}", f.name(), format_data_type(f.data_type())))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Struct<{}>", inner)
        }
        DataType::Timestamp(unit, tz) => format!("Timestamp({:?}, {:?})", unit, tz),
        _ => format!("{:?}", data_type),
    }
}
