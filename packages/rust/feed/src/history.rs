//! Persisted announcement history.
//!
//! Maps product title → first-seen timestamp so a product keeps its
//! original `pubDate` across runs instead of being re-announced.
//! Stored as pretty JSON next to the feed; older deployments only have
//! the feed XML itself, which is parsed as a fallback history source.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use shelfwatch_shared::{Result, ShelfwatchError};

/// Title → first-seen timestamp map, append-only across runs.
///
/// A `BTreeMap` keeps the serialized JSON in a stable order, so the
/// committed history file diffs cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(BTreeMap<String, String>);

impl History {
    /// The timestamp a title was first announced at, if known.
    pub fn first_seen(&self, title: &str) -> Option<&str> {
        self.0.get(title).map(String::as_str)
    }

    /// Record a title's first-seen timestamp. Existing entries win.
    pub fn record(&mut self, title: &str, date: &str) {
        self.0.entry(title.to_string()).or_insert_with(|| date.to_string());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for History {
    fn from(entries: [(&str, &str); N]) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(t, d)| (t.to_string(), d.to_string()))
                .collect(),
        )
    }
}

/// History file path for a given feed path (same basename, `.json`).
pub fn history_path(feed_path: &Path) -> PathBuf {
    feed_path.with_extension("json")
}

/// Load history: JSON file first, then the previous feed XML, else empty.
///
/// A malformed history file is a run failure — starting silently from
/// an empty history would re-date every product in the feed.
pub fn load_history(history_path: &Path, feed_path: &Path) -> Result<History> {
    if history_path.exists() {
        debug!(path = ?history_path, "loading JSON history");
        let content = std::fs::read_to_string(history_path)
            .map_err(|e| ShelfwatchError::io(history_path, e))?;
        return serde_json::from_str(&content).map_err(|e| {
            ShelfwatchError::parse(format!(
                "malformed history file {}: {e}",
                history_path.display()
            ))
        });
    }

    if feed_path.exists() {
        info!(path = ?feed_path, "no JSON history, migrating from previous feed XML");
        return history_from_feed(feed_path);
    }

    debug!("no history found, starting empty");
    Ok(History::default())
}

/// Extract title → pubDate pairs from a previously generated feed.
fn history_from_feed(feed_path: &Path) -> Result<History> {
    let file = File::open(feed_path).map_err(|e| ShelfwatchError::io(feed_path, e))?;
    let channel = rss::Channel::read_from(BufReader::new(file)).map_err(|e| {
        ShelfwatchError::parse(format!("malformed feed XML {}: {e}", feed_path.display()))
    })?;

    let mut history = History::default();
    for item in channel.items() {
        if let (Some(title), Some(pub_date)) = (item.title(), item.pub_date()) {
            history.record(title, pub_date);
        }
    }

    Ok(history)
}

/// Write the history as pretty JSON, creating parent directories.
pub fn save_history(history: &History, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ShelfwatchError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(history)
        .map_err(|e| ShelfwatchError::parse(format!("history serialization failed: {e}")))?;
    std::fs::write(path, json).map_err(|e| ShelfwatchError::io(path, e))?;

    debug!(path = ?path, entries = history.len(), "history saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<rss version="2.0">
    <channel>
        <title>DAISOの新着商品</title>
        <link>https://jp.daisonet.com/collections/newarrival</link>
        <description>DAISO 新着商品の一覧</description>
        <item>
            <title>Existing Item</title>
            <link>https://jp.daisonet.com/products/existing</link>
            <pubDate>Tue, 31 Dec 2024 00:00:00 +0900</pubDate>
        </item>
    </channel>
</rss>
"#;

    #[test]
    fn record_does_not_overwrite() {
        let mut history = History::default();
        history.record("商品A", "Wed, 01 Jan 2025 00:00:00 +0900");
        history.record("商品A", "Thu, 02 Jan 2025 00:00:00 +0900");
        assert_eq!(
            history.first_seen("商品A"),
            Some("Wed, 01 Jan 2025 00:00:00 +0900")
        );
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn history_path_swaps_extension() {
        assert_eq!(
            history_path(Path::new("docs/daiso_new_arrivals.xml")),
            Path::new("docs/daiso_new_arrivals.json")
        );
    }

    #[test]
    fn load_prefers_json() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("feed.json");
        let feed_path = dir.path().join("feed.xml");

        std::fs::write(&json_path, r#"{"Item A": "Date A"}"#).unwrap();
        std::fs::write(&feed_path, LEGACY_FEED).unwrap();

        let history = load_history(&json_path, &feed_path).unwrap();
        assert_eq!(history.first_seen("Item A"), Some("Date A"));
        assert_eq!(history.first_seen("Existing Item"), None);
    }

    #[test]
    fn load_falls_back_to_feed_xml() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("feed.json");
        let feed_path = dir.path().join("feed.xml");

        std::fs::write(&feed_path, LEGACY_FEED).unwrap();

        let history = load_history(&json_path, &feed_path).unwrap();
        assert_eq!(
            history.first_seen("Existing Item"),
            Some("Tue, 31 Dec 2024 00:00:00 +0900")
        );
    }

    #[test]
    fn load_with_nothing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let history =
            load_history(&dir.path().join("feed.json"), &dir.path().join("feed.xml")).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("feed.json");
        std::fs::write(&json_path, "{not json").unwrap();

        let result = load_history(&json_path, &dir.path().join("feed.xml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("malformed history"));
    }

    #[test]
    fn save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("nested/out/feed.json");

        let history = History::from([
            ("商品A", "Wed, 01 Jan 2025 00:00:00 +0900"),
            ("商品B", "Thu, 02 Jan 2025 00:00:00 +0900"),
        ]);
        save_history(&history, &json_path).unwrap();

        let reloaded = load_history(&json_path, &dir.path().join("feed.xml")).unwrap();
        assert_eq!(reloaded, history);
    }
}
