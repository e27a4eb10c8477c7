//! Settings for the previewer and the converter.

use std::path::PathBuf;

use crate::ConvertCli;

/// Column the preview is indexed by.
pub const DEFAULT_INDEX_COLUMN: &str = "datetime_str";

/// Rows shown per file.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewConfig {
    /// Moved to the front of the preview. Files without it fail to load.
    pub index_column: String,
    pub preview_rows: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            index_column: DEFAULT_INDEX_COLUMN.to_string(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl PreviewConfig {
    pub fn with_index_column(mut self, column: impl Into<String>) -> Self {
        self.index_column = column.into();
        self
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// `None` runs on rayon's global pool.
    pub threads: Option<usize>,
}

impl From<ConvertCli> for ConvertConfig {
    fn from(cli: ConvertCli) -> Self {
        Self {
            input: cli.input,
            output: cli.output,
            threads: cli.threads,
        }
    }
}
