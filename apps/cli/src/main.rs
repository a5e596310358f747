//! shelfwatch CLI — new-arrivals listing scraper with RSS output.
//!
//! Scrapes a retail site's paginated new-arrivals listing and writes an
//! RSS feed plus a history of already-announced products.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
