//! Test data factory for record batches and files on disk.
//!
//! # Usage
//!
//! ```rust
//! use parquet_preview::utils::test_data::TestBatch;
//!
//! let batch = TestBatch::builder()
//!     .column_i32("id", &[1, 2, 3])
//!     .column_string("datetime_str", &["2024-01-02 09:00:00", "2024-01-02 09:01:00", "2024-01-02 09:02:00"])
//!     .build();
//!
//! // or using a preset batch
//! let batch = TestBatch::id_datetime_value(3);
//! ```

use std::sync::Arc;

use arrow::{
    array::{ArrayRef, Float64Array, Int32Array, RecordBatch, StringArray, UInt64Array},
    datatypes::{Field, Schema},
};
use parquet::arrow::{ArrowWriter, arrow_reader::ParquetRecordBatchReaderBuilder};
use std::{fs::File, path::Path};

/// Header and two rows in the quote export layout read by the converter.
pub const QUOTES_CSV: &str = "\
<DATE>,<TIME>,<OPEN>,<HIGH>,<LOW>,<CLOSE>,<VOL>
20240102,090000,101.5,102.25,101.0,102.0,1200
20240102,090100,102.0,102.5,101.75,102.25,800
";

#[derive(Default)]
pub struct TestBatchBuilder {
    columns: Vec<(String, ArrayRef, bool)>, // (name, array, nullable)
}

impl TestBatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column_i32(mut self, name: &str, values: &[i32]) -> Self {
        let array: ArrayRef = Arc::new(Int32Array::from(values.to_vec()));
        self.columns.push((name.to_string(), array, false));
        self
    }

    pub fn column_u64(mut self, name: &str, values: &[u64]) -> Self {
        let array: ArrayRef = Arc::new(UInt64Array::from(values.to_vec()));
        self.columns.push((name.to_string(), array, false));
        self
    }

    pub fn column_f64(mut self, name: &str, values: &[f64]) -> Self {
        let array: ArrayRef = Arc::new(Float64Array::from(values.to_vec()));
        self.columns.push((name.to_string(), array, false));
        self
    }

    pub fn column_f64_nullable(mut self, name: &str, values: &[Option<f64>]) -> Self {
        let array: ArrayRef = Arc::new(Float64Array::from(values.to_vec()));
        self.columns.push((name.to_string(), array, true));
        self
    }

    pub fn column_string(mut self, name: &str, values: &[&str]) -> Self {
        let array: ArrayRef = Arc::new(StringArray::from(values.to_vec()));
        self.columns.push((name.to_string(), array, false));
        self
    }

    pub fn build(self) -> RecordBatch {
        let fields: Vec<Field> = self
            .columns
            .iter()
            .map(|(name, array, nullable)| Field::new(name, array.data_type().clone(), *nullable))
            .collect();
        let arrays: Vec<ArrayRef> = self.columns.into_iter().map(|(_, a, _)| a).collect();
        let schema = Arc::new(Schema::new(fields));
        RecordBatch::try_new(schema, arrays).expect("failed to create RecordBatch")
    }
}

pub struct TestBatch;

impl TestBatch {
    pub fn builder() -> TestBatchBuilder {
        TestBatchBuilder::new()
    }

    /// id (i32), name (string) - 3 rows, no `datetime_str`
    pub fn simple() -> RecordBatch {
        TestBatchBuilder::new()
            .column_i32("id", &[1, 2, 3])
            .column_string("name", &["a", "b", "c"])
            .build()
    }

    /// id (i32), datetime_str (string), value (f64) - `rows` rows, one minute apart
    /// starting at 2024-01-02 09:00:00
    pub fn id_datetime_value(rows: usize) -> RecordBatch {
        assert!(rows < 60, "minutes only");
        let ids: Vec<i32> = (0..rows).map(|i| i32::try_from(i).unwrap()).collect();
        let datetimes: Vec<String> = (0..rows)
            .map(|i| format!("2024-01-02 09:{i:02}:00"))
            .collect();
        let datetime_refs: Vec<&str> = datetimes.iter().map(String::as_str).collect();
        let values: Vec<f64> = (0..rows).map(|i| 100.0 + i as f64 / 4.0).collect();

        TestBatchBuilder::new()
            .column_i32("id", &ids)
            .column_string("datetime_str", &datetime_refs)
            .column_f64("value", &values)
            .build()
    }
}

pub struct TestFile;

impl TestFile {
    pub fn write_parquet(path: &Path, batches: &[RecordBatch]) {
        assert!(!batches.is_empty(), "need at least one batch");
        let schema = batches[0].schema();
        let file = File::create(path).expect("failed to create file");
        let mut writer = ArrowWriter::try_new(file, schema, None).expect("failed to create writer");
        for batch in batches {
            writer.write(batch).expect("failed to write batch");
        }
        writer.close().expect("failed to close writer");
    }

    pub fn write_parquet_batch(path: &Path, batch: &RecordBatch) {
        Self::write_parquet(path, std::slice::from_ref(batch));
    }

    pub fn read_parquet(path: &Path) -> Vec<RecordBatch> {
        let file = File::open(path).expect("failed to open file");
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .expect("failed to create reader builder")
            .build()
            .expect("failed to build reader");
        reader
            .collect::<Result<Vec<_>, _>>()
            .expect("failed to read batches")
    }

    pub fn write_text(path: &Path, contents: &str) {
        std::fs::write(path, contents).expect("failed to write file");
    }

    pub fn write_invalid_file(path: &Path) {
        Self::write_text(path, "not a parquet file");
    }
}

pub struct TestExtract;

impl TestExtract {
    /// panics on null
    pub fn string(batch: &RecordBatch, column: &str) -> Vec<String> {
        let col = batch
            .column_by_name(column)
            .unwrap_or_else(|| panic!("column '{column}' not found"));
        let arr = col
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap_or_else(|| panic!("column '{column}' is not String"));
        arr.iter()
            .map(|v| v.expect("unexpected null").to_string())
            .collect()
    }

    pub fn f64(batch: &RecordBatch, column: &str) -> Vec<f64> {
        let col = batch
            .column_by_name(column)
            .unwrap_or_else(|| panic!("column '{column}' not found"));
        let arr = col
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap_or_else(|| panic!("column '{column}' is not Float64"));
        arr.values().to_vec()
    }

    pub fn u64(batch: &RecordBatch, column: &str) -> Vec<u64> {
        let col = batch
            .column_by_name(column)
            .unwrap_or_else(|| panic!("column '{column}' not found"));
        let arr = col
            .as_any()
            .downcast_ref::<UInt64Array>()
            .unwrap_or_else(|| panic!("column '{column}' is not UInt64"));
        arr.values().to_vec()
    }
}
