//! Shared types, error model, and configuration for shelfwatch.
//!
//! This crate is the foundation depended on by all other shelfwatch crates.
//! It provides:
//! - [`ShelfwatchError`] — the unified error type
//! - Domain types ([`Product`])
//! - Configuration ([`AppConfig`], [`ScrapeConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ChannelConfig, DefaultsConfig, ScrapeConfig, ScrapeSection, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, ShelfwatchError};
pub use types::Product;
