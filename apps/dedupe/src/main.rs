use anyhow::Result;
use clap::Parser;

use saleguard_dedupe::cli::Cli;
use saleguard_dedupe::{init_tracing, run};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    run(cli).await
}
