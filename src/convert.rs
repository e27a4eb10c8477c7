//! CSV/TXT quote exports to Parquet.
//!
//! Produces the files the previewer reads: `<DATE>` and `<TIME>` are merged
//! into a `datetime_str` column and the price/volume columns are carried over.
//! Columns are found by header name, so their order does not matter and
//! extra columns such as `<TICKER>` are skipped. Files are converted in
//! parallel on a rayon pool; one bad file is reported and skipped without
//! stopping the others.

use std::{
    fs::{self, File},
    io::{Read, Seek},
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use anyhow::{Context, Result, anyhow, bail};
use arrow::{
    array::{ArrayRef, AsArray, RecordBatch, StringBuilder},
    csv::{ReaderBuilder, reader::Format},
    datatypes::{DataType, Field, Schema, SchemaRef},
};
use chrono::NaiveDateTime;
use parquet::arrow::ArrowWriter;
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::{
    config::{ConvertConfig, DEFAULT_INDEX_COLUMN},
    progress::ConvertProgress,
};

/// Only files with this extension are picked up from the input directory.
pub const INPUT_EXTENSION: &str = "txt";

const INPUT_DATETIME_FORMAT: &str = "%Y%m%d %H%M%S";
const OUTPUT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header names read from every export, in the order the output uses them.
pub fn input_columns() -> [(&'static str, DataType); 7] {
    [
        ("<DATE>", DataType::Utf8),
        ("<TIME>", DataType::Utf8),
        ("<OPEN>", DataType::Float64),
        ("<HIGH>", DataType::Float64),
        ("<LOW>", DataType::Float64),
        ("<CLOSE>", DataType::Float64),
        ("<VOL>", DataType::UInt64),
    ]
}

/// Schema for an export with the given header, plus the projection that
/// picks out [`input_columns`] in their listed order.
///
/// Columns not in [`input_columns`] are kept as strings and never parsed.
pub fn input_schema(header: &[String]) -> Result<(SchemaRef, Vec<usize>)> {
    let wanted = input_columns();

    let fields: Vec<Field> = header
        .iter()
        .map(|name| {
            let data_type = wanted
                .iter()
                .find(|(wanted_name, _)| wanted_name == name)
                .map_or(DataType::Utf8, |(_, data_type)| data_type.clone());
            Field::new(name, data_type, true)
        })
        .collect();

    let projection = wanted
        .iter()
        .map(|(name, _)| {
            header
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| anyhow!("Column '{}' not found in header", name))
        })
        .collect::<Result<Vec<usize>>>()?;

    Ok((Arc::new(Schema::new(fields)), projection))
}

/// Header names of a CSV export, leaving the reader positioned at the start.
fn read_header<R: Read + Seek>(reader: &mut R) -> Result<Vec<String>> {
    let (schema, _) = Format::default()
        .with_header(true)
        .infer_schema(&mut *reader, Some(0))?;
    reader.rewind()?;
    Ok(schema.fields().iter().map(|f| f.name().clone()).collect())
}

pub fn output_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(DEFAULT_INDEX_COLUMN, DataType::Utf8, false),
        Field::new("open", DataType::Float64, false),
        Field::new("high", DataType::Float64, false),
        Field::new("low", DataType::Float64, false),
        Field::new("close", DataType::Float64, false),
        Field::new("vol", DataType::UInt64, false),
    ]))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub converted: usize,
    pub failed: usize,
}

/// Fail unless `path` exists and is a directory.
pub fn check_input_dir(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_dir() {
        bail!("Provide directory, not file!");
    }
    Ok(())
}

/// Create the output directory, or empty it of regular files if it exists.
pub fn prepare_output_dir(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        bail!("Output directory path is empty");
    }

    if !path.exists() {
        fs::create_dir_all(path)?;
        return Ok(());
    }

    for entry in fs::read_dir(path)? {
        let entry_path = entry?.path();
        if entry_path.is_file() {
            debug!(path = %entry_path.display(), "removing stale output");
            fs::remove_file(&entry_path)?;
        }
    }
    Ok(())
}

/// Regular files in `dir` with the [`INPUT_EXTENSION`], sorted by path.
pub fn list_input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == INPUT_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// `<output_dir>/<input stem>.parquet`
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    output_dir.join(format!("{stem}.parquet"))
}

/// Thread count to convert with.
///
/// Requests above the available parallelism are capped with a warning.
pub fn effective_threads(requested: Option<usize>) -> Result<usize> {
    match requested {
        Some(0) => Err(anyhow!("Number of threads must be a positive integer")),
        Some(n) => {
            let max_threads = std::thread::available_parallelism().map_or(1, |n| n.get());
            if n > max_threads {
                warn!(
                    requested = n,
                    max_threads, "limiting thread count to available parallelism"
                );
                Ok(max_threads)
            } else {
                Ok(n)
            }
        }
        None => Ok(rayon::current_num_threads()),
    }
}

/// `20240102` + `093000` -> `2024-01-02 09:30:00`
pub fn format_datetime(date: &str, time: &str) -> Result<String> {
    let raw = format!("{} {}", date.trim(), time.trim());
    let parsed = NaiveDateTime::parse_from_str(&raw, INPUT_DATETIME_FORMAT)
        .map_err(|e| anyhow!("Failed to parse datetime '{}': {}", raw, e))?;
    Ok(parsed.format(OUTPUT_DATETIME_FORMAT).to_string())
}

fn to_output_batch(batch: &RecordBatch, schema: &SchemaRef) -> Result<RecordBatch> {
    let dates = batch.column(0).as_string::<i32>();
    let times = batch.column(1).as_string::<i32>();

    let mut datetimes = StringBuilder::with_capacity(batch.num_rows(), batch.num_rows() * 19);
    for (date, time) in dates.iter().zip(times.iter()) {
        let (Some(date), Some(time)) = (date, time) else {
            bail!("Missing <DATE> or <TIME> value");
        };
        datetimes.append_value(format_datetime(date, time)?);
    }

    let mut columns: Vec<ArrayRef> = vec![Arc::new(datetimes.finish())];
    columns.extend(batch.columns()[2..].iter().cloned());

    Ok(RecordBatch::try_new(Arc::clone(schema), columns)?)
}

/// Convert one export to Parquet, returning the number of rows written.
///
/// The whole input is read before the output is created, so a file that
/// fails to parse leaves nothing behind.
pub fn convert_file(input: &Path, output: &Path) -> Result<usize> {
    let schema = output_schema();
    let mut file = File::open(input)?;
    let (input_schema, projection) = input_schema(&read_header(&mut file)?)?;
    let reader = ReaderBuilder::new(input_schema)
        .with_header(true)
        .with_projection(projection)
        .build(file)?;

    let mut batches = Vec::new();
    for batch in reader {
        batches.push(to_output_batch(&batch?, &schema)?);
    }

    let mut writer = ArrowWriter::try_new(File::create(output)?, Arc::clone(&schema), None)?;
    let mut rows = 0;
    for batch in &batches {
        writer.write(batch)?;
        rows += batch.num_rows();
    }
    writer.close()?;

    Ok(rows)
}

fn convert_into(input: &Path, output_dir: &Path, progress: &ConvertProgress) -> bool {
    let output = output_path_for(input, output_dir);
    let started = Instant::now();

    let converted = match convert_file(input, &output)
        .with_context(|| format!("Failed to convert file {}", input.display()))
    {
        Ok(rows) => {
            progress.suspend(|| {
                info!(
                    "Converted '{}' ({} rows) in {:.2}s",
                    input.display(),
                    rows,
                    started.elapsed().as_secs_f64()
                )
            });
            true
        }
        Err(e) => {
            progress.suspend(|| error!("{:#}", e));
            false
        }
    };

    progress.inc();
    converted
}

/// Convert every input file into the output directory.
///
/// Per-file failures are logged and counted; only setup errors are returned.
pub fn convert_all(config: &ConvertConfig) -> Result<ConvertSummary> {
    let files = list_input_files(&config.input)?;
    info!(count = files.len(), "found file(s) to convert");

    let progress = ConvertProgress::new(files.len())?;
    let summary = convert_files(&files, config, &progress)?;
    progress.finish();
    Ok(summary)
}

/// Convert `files` into `config.output`, advancing `progress` once per file.
pub fn convert_files(
    files: &[PathBuf],
    config: &ConvertConfig,
    progress: &ConvertProgress,
) -> Result<ConvertSummary> {
    let run = || {
        files
            .par_iter()
            .map(|input| convert_into(input, &config.output, progress))
            .collect::<Vec<bool>>()
    };

    let outcomes = match config.threads {
        Some(requested) => {
            let threads = effective_threads(Some(requested))?;
            info!(threads, "using dedicated thread pool");
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| anyhow!("Failed to build thread pool: {}", e))?
                .install(run)
        }
        None => {
            info!(threads = effective_threads(None)?, "using global thread pool");
            run()
        }
    };

    let converted = outcomes.iter().filter(|ok| **ok).count();
    Ok(ConvertSummary {
        converted,
        failed: outcomes.len() - converted,
    })
}
