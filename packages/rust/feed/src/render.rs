//! RSS 2.0 feed generation.
//!
//! Each product becomes one item; its `pubDate` is the first-seen
//! timestamp from history when the title is already known, otherwise
//! the current run's timestamp. `lastBuildDate` is always "now".

use chrono::{FixedOffset, Utc};
use rss::{ChannelBuilder, ItemBuilder, validation::Validate};
use url::Url;

use shelfwatch_shared::{ChannelConfig, Product, Result, ShelfwatchError};

use crate::history::History;

/// Seconds east of UTC for JST (+0900), the listing's local time.
const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Current time as an RFC 2822 string in JST, e.g.
/// `Wed, 11 Jun 2008 15:30:59 +0900`.
pub fn now_jst() -> String {
    let jst = FixedOffset::east_opt(JST_OFFSET_SECS).expect("valid JST offset");
    Utc::now().with_timezone(&jst).to_rfc2822()
}

/// Render the feed XML for the scraped products.
///
/// `now` is passed in rather than sampled here so every item created
/// in one run carries the same timestamp as the history file.
pub fn render_feed(
    products: &[Product],
    history: &History,
    channel: &ChannelConfig,
    listing_url: &Url,
    now: &str,
) -> Result<String> {
    let items: Vec<rss::Item> = products
        .iter()
        .map(|product| {
            ItemBuilder::default()
                .title(product.title.clone())
                .link(product.link.clone())
                .pub_date(history.first_seen(&product.title).unwrap_or(now).to_string())
                .build()
        })
        .collect();

    let feed = ChannelBuilder::default()
        .title(channel.title.clone())
        .link(channel.link_or(listing_url))
        .description(channel.description.clone())
        .language(channel.language.clone())
        .last_build_date(now.to_string())
        .items(items)
        .build();

    feed.validate()
        .map_err(|e| ShelfwatchError::Feed(format!("RSS validation failed: {e}")))?;

    let buf = feed
        .pretty_write_to(Vec::new(), b' ', 2)
        .map_err(|e| ShelfwatchError::Feed(format!("RSS serialization failed: {e}")))?;
    let xml = String::from_utf8(buf)
        .map_err(|e| ShelfwatchError::Feed(format!("RSS output is not UTF-8: {e}")))?;

    if xml.starts_with("<?xml") {
        Ok(xml)
    } else {
        Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{xml}"))
    }
}
