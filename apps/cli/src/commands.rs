//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use shelfwatch_core::{ProgressReporter, RunConfig, RunReport};
use shelfwatch_shared::{AppConfig, ScrapeConfig, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// shelfwatch — turn a store's new-arrivals listing into an RSS feed.
#[derive(Parser)]
#[command(
    name = "shelfwatch",
    version,
    about = "Scrape a retail new-arrivals listing and emit an RSS feed.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Scrape the listing and write the feed and history files.
    Run {
        /// Feed output path (the history file sits next to it as .json).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Listing URL to scrape (overrides the config file).
        #[arg(long)]
        listing_url: Option<String>,

        /// Maximum concurrent page fetches (overrides the config file).
        #[arg(long)]
        concurrency: Option<u32>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = format!(
        "shelfwatch_shared={level},shelfwatch_scrape={level},shelfwatch_feed={level},shelfwatch_core={level},shelfwatch_cli={level}"
    );

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            output,
            listing_url,
            concurrency,
        } => cmd_run(output, listing_url.as_deref(), concurrency).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

async fn cmd_run(
    output: Option<PathBuf>,
    listing_url: Option<&str>,
    concurrency: Option<u32>,
) -> Result<()> {
    // Unattended invocation: failures are logged, the process exits 0.
    if let Err(e) = try_run(output, listing_url, concurrency).await {
        error!(error = %e, "run failed");
    }
    Ok(())
}

async fn try_run(
    output: Option<PathBuf>,
    listing_url: Option<&str>,
    concurrency: Option<u32>,
) -> shelfwatch_shared::Result<()> {
    let config = load_config()?;

    let scrape = ScrapeConfig::from_app(&config, listing_url, concurrency)?;
    let output = output.unwrap_or_else(|| PathBuf::from(&config.defaults.output));

    let run_config = RunConfig {
        output,
        scrape,
        channel: config.channel.clone(),
    };

    info!(
        listing_url = %run_config.scrape.listing_url,
        output = %run_config.output.display(),
        "starting run"
    );

    let reporter = CliProgress::new();
    let report = shelfwatch_core::run(&run_config, &reporter).await?;

    println!();
    println!("  Feed updated!");
    println!("  Products: {}", report.product_count);
    println!("  New:      {}", report.new_count);
    println!(
        "  Pages:    {} ({} failed)",
        report.pages_total, report.pages_failed
    );
    println!("  Feed:     {}", report.feed_path.display());
    println!("  History:  {}", report.history_path.display());
    println!("  Time:     {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
