//! CLI entry point.

use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::init_tracing();
    let cli = Cli::parse();
    cli.run().await
}
