use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use parquet_preview::{ConvertCli, config::ConvertConfig, convert, logging};
use tracing::info;

fn main() -> Result<()> {
    logging::init_logging("info");

    let config = ConvertConfig::from(ConvertCli::parse());
    let started = Instant::now();
    info!("Start conversion...");

    convert::check_input_dir(&config.input)?;
    convert::prepare_output_dir(&config.output)?;

    let summary = convert::convert_all(&config)?;

    println!(
        "Converted {} file(s), {} failed, in {:.2}s",
        summary.converted,
        summary.failed,
        started.elapsed().as_secs_f64()
    );
    Ok(())
}
