pub mod config;
pub mod convert;
pub mod logging;
pub mod preview;
pub mod progress;
pub mod reader;
pub mod utils;

use clap::{Parser, builder::ValueHint};
use std::path::PathBuf;

/// Parse a usize that must be at least 1.
fn parse_at_least_one(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|e| format!("{e}"))?;
    if n == 0 {
        Err("value must be at least 1".into())
    } else {
        Ok(n)
    }
}

/// Print the first rows and the schema of every Parquet file in a directory.
///
/// Each entry is read twice: once through DataFusion for a row preview indexed
/// by `datetime_str`, and once through the parquet footer for its schema.
#[derive(Parser, Debug)]
#[command(name = "parquet-preview", version, about, long_about = None)]
pub struct PreviewCli {
    /// Directory holding the Parquet files (exactly one).
    ///
    /// The argument count is checked by the previewer itself so that a wrong
    /// count prints the usage line instead of a parser error.
    #[arg(
        value_hint = ValueHint::DirPath,
        num_args = 0..,
        allow_hyphen_values = true,
        trailing_var_arg = true
    )]
    pub paths: Vec<String>,
}

/// Convert CSV/TXT quote exports to Parquet files with a `datetime_str` column.
#[derive(Parser, Debug)]
#[command(name = "csv-to-parquet", version, about, long_about = None)]
pub struct ConvertCli {
    /// Path to input directory with CSV/TXT files
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub input: PathBuf,

    /// Path to output directory for Parquet files
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub output: PathBuf,

    /// Number of threads to use (default: all available)
    #[arg(short, long, value_parser = parse_at_least_one)]
    pub threads: Option<usize>,
}
