//! Application configuration for shelfwatch.
//!
//! User config lives at `~/.shelfwatch/shelfwatch.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, ShelfwatchError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "shelfwatch.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".shelfwatch";

// ---------------------------------------------------------------------------
// Config structs (matching shelfwatch.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Scrape settings.
    #[serde(default)]
    pub scrape: ScrapeSection,

    /// RSS channel metadata.
    #[serde(default)]
    pub channel: ChannelConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default feed output path.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "docs/daiso_new_arrivals.xml".into()
}

/// `[scrape]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSection {
    /// New-arrivals listing URL (page 1).
    #[serde(default = "default_listing_url")]
    pub listing_url: String,

    /// Maximum concurrent page fetches.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Query parameter carrying the page number.
    #[serde(default = "default_page_param")]
    pub page_param: String,
}

impl Default for ScrapeSection {
    fn default() -> Self {
        Self {
            listing_url: default_listing_url(),
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            page_param: default_page_param(),
        }
    }
}

fn default_listing_url() -> String {
    "https://jp.daisonet.com/collections/newarrival".into()
}
fn default_concurrency() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_page_param() -> String {
    "page".into()
}

/// `[channel]` section — RSS channel metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Channel title.
    #[serde(default = "default_channel_title")]
    pub title: String,

    /// Channel link. Empty string means "use the listing URL".
    #[serde(default)]
    pub link: String,

    /// Channel description.
    #[serde(default = "default_channel_description")]
    pub description: String,

    /// Channel language code.
    #[serde(default = "default_channel_language")]
    pub language: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            title: default_channel_title(),
            link: String::new(),
            description: default_channel_description(),
            language: default_channel_language(),
        }
    }
}

fn default_channel_title() -> String {
    "DAISOの新着商品".into()
}
fn default_channel_description() -> String {
    "DAISO 新着商品の一覧".into()
}
fn default_channel_language() -> String {
    "ja".into()
}

// ---------------------------------------------------------------------------
// Scrape config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime scrape configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Parsed listing URL (page 1).
    pub listing_url: Url,
    /// Maximum concurrent page fetches.
    pub concurrency: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Query parameter carrying the page number.
    pub page_param: String,
}

impl ScrapeConfig {
    /// Build a runtime scrape config from the app config, applying
    /// CLI overrides where given.
    pub fn from_app(
        config: &AppConfig,
        listing_url: Option<&str>,
        concurrency: Option<u32>,
    ) -> Result<Self> {
        let raw_url = listing_url.unwrap_or(&config.scrape.listing_url);
        let listing_url = Url::parse(raw_url).map_err(|e| {
            ShelfwatchError::config(format!("listing_url '{raw_url}' is not a valid URL: {e}"))
        })?;

        let concurrency = concurrency.unwrap_or(config.scrape.concurrency).max(1);

        Ok(Self {
            listing_url,
            concurrency,
            timeout_secs: config.scrape.timeout_secs,
            page_param: config.scrape.page_param.clone(),
        })
    }
}

impl ChannelConfig {
    /// Resolve the channel link, falling back to the listing URL.
    pub fn link_or(&self, listing_url: &Url) -> String {
        if self.link.is_empty() {
            listing_url.to_string()
        } else {
            self.link.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.shelfwatch/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ShelfwatchError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.shelfwatch/shelfwatch.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ShelfwatchError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ShelfwatchError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ShelfwatchError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ShelfwatchError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ShelfwatchError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
