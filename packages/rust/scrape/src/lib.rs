//! Listing scraper for shelfwatch: HTTP fetch + HTML extraction.
//!
//! [`Scraper`] fetches the paginated new-arrivals listing with bounded
//! concurrency; [`parser`] holds the selector-based extraction.

pub mod fetcher;
pub mod parser;

pub use fetcher::{ScrapeOutcome, Scraper};
pub use parser::{image_url, last_page, parse_products};
