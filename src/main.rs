use anyhow::Result;
use clap::Parser;
use parquet_preview::{PreviewCli, logging, preview};

#[tokio::main]
async fn main() -> Result<()> {
    // stdout belongs to the preview output; diagnostics stay quiet unless RUST_LOG asks
    logging::init_logging("warn");

    let cli = PreviewCli::parse();
    let mut out = std::io::stdout();
    preview::run(&cli.paths, &mut out).await
}
