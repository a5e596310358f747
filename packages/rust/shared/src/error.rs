//! Error types for shelfwatch.
//!
//! Library crates use [`ShelfwatchError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all shelfwatch operations.
#[derive(Debug, thiserror::Error)]
pub enum ShelfwatchError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during scraping.
    #[error("network error: {0}")]
    Network(String),

    /// HTML or history-file parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// RSS feed construction or validation error.
    #[error("feed error: {0}")]
    Feed(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ShelfwatchError>;

impl ShelfwatchError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ShelfwatchError::config("listing_url is not a valid URL");
        assert_eq!(err.to_string(), "config error: listing_url is not a valid URL");

        let err = ShelfwatchError::parse("product list not found");
        assert!(err.to_string().contains("product list not found"));

        let err = ShelfwatchError::Network("HTTP 503".into());
        assert_eq!(err.to_string(), "network error: HTTP 503");
    }
}
