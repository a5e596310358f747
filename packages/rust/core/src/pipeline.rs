//! End-to-end run pipeline: scrape → history → render → persist.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, instrument};

use shelfwatch_feed::{History, history_path, load_history, now_jst, render_feed, save_history};
use shelfwatch_scrape::Scraper;
use shelfwatch_shared::{ChannelConfig, Result, ScrapeConfig, ShelfwatchError};

/// Configuration for a single run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Feed output path; the history path is derived from it.
    pub output: PathBuf,
    /// Scrape configuration.
    pub scrape: ScrapeConfig,
    /// RSS channel metadata.
    pub channel: ChannelConfig,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunReport {
    /// Products currently on the listing.
    pub product_count: usize,
    /// Products announced for the first time this run.
    pub new_count: usize,
    /// Listing pages reported by the pagination nav.
    pub pages_total: u32,
    /// Pages skipped due to fetch/parse errors.
    pub pages_failed: u32,
    /// Where the feed was written.
    pub feed_path: PathBuf,
    /// Where the history was written.
    pub history_path: PathBuf,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _report: &RunReport) {}
}

/// Run the full pipeline.
///
/// 1. Fetch and parse all listing pages
/// 2. Load history (JSON, falling back to the previous feed XML)
/// 3. Render the feed, reusing first-seen dates for known titles
/// 4. Write the feed
/// 5. Record new titles and save the history
#[instrument(skip_all, fields(output = %config.output.display()))]
pub async fn run(config: &RunConfig, progress: &dyn ProgressReporter) -> Result<RunReport> {
    let start = Instant::now();
    let now = now_jst();

    progress.phase("Fetching new arrivals");
    let scraper = Scraper::new(config.scrape.clone())?;
    let outcome = scraper.fetch_new_arrivals().await?;

    progress.phase("Loading history");
    let history_path = history_path(&config.output);
    let mut history = load_history(&history_path, &config.output)?;
    info!(entries = history.len(), "history loaded");

    progress.phase("Rendering feed");
    let xml = render_feed(
        &outcome.products,
        &history,
        &config.channel,
        &config.scrape.listing_url,
        &now,
    )?;

    progress.phase("Writing feed");
    if let Some(parent) = config.output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ShelfwatchError::io(parent, e))?;
    }
    std::fs::write(&config.output, &xml).map_err(|e| ShelfwatchError::io(&config.output, e))?;

    progress.phase("Saving history");
    let new_count = record_products(&mut history, &outcome.products, &now);
    save_history(&history, &history_path)?;

    let report = RunReport {
        product_count: outcome.products.len(),
        new_count,
        pages_total: outcome.pages_total,
        pages_failed: outcome.pages_failed,
        feed_path: config.output.clone(),
        history_path,
        elapsed: start.elapsed(),
    };

    info!(
        products = report.product_count,
        new = report.new_count,
        pages_total = report.pages_total,
        pages_failed = report.pages_failed,
        elapsed_ms = report.elapsed.as_millis(),
        "run completed"
    );

    progress.done(&report);
    Ok(report)
}

/// Record first-seen dates for unseen titles; returns how many were new.
fn record_products(history: &mut History, products: &[shelfwatch_shared::Product], now: &str) -> usize {
    let mut new_count = 0;
    for product in products {
        if history.first_seen(&product.title).is_none() {
            new_count += 1;
        }
        history.record(&product.title, now);
    }
    new_count
}
