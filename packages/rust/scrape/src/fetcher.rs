//! Concurrent paginated listing fetcher.
//!
//! Page 1 is fetched first to learn the page count from the pagination
//! nav; the remaining pages are fetched concurrently, bounded by a
//! semaphore. Per-page failures are logged and contribute zero
//! products — a partial listing is still a usable feed.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use scraper::Html;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};
use url::Url;

use shelfwatch_shared::{Product, Result, ScrapeConfig, ShelfwatchError};

use crate::parser;

/// User-Agent string for scrape requests.
const USER_AGENT: &str = concat!("shelfwatch/", env!("CARGO_PKG_VERSION"));

/// Summary of a completed scrape.
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    /// Products in page order, page 1 first.
    pub products: Vec<Product>,
    /// Number of listing pages reported by the pagination nav.
    pub pages_total: u32,
    /// Pages that failed to fetch or parse and were skipped.
    pub pages_failed: u32,
}

/// Fetches and extracts the new-arrivals listing.
pub struct Scraper {
    config: ScrapeConfig,
    client: Client,
}

impl Scraper {
    /// Create a new scraper with the given configuration.
    pub fn new(config: ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ShelfwatchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Fetch every page of the listing and return the concatenated products.
    ///
    /// A failure on page 1 is a run failure — without it there is no
    /// page count and no products. Later pages are best-effort.
    #[instrument(skip_all, fields(listing_url = %self.config.listing_url))]
    pub async fn fetch_new_arrivals(&self) -> Result<ScrapeOutcome> {
        let body = fetch_text(&self.client, self.config.listing_url.as_str()).await?;

        let (mut products, pages_total) = {
            let doc = Html::parse_document(&body);
            let products = parser::parse_products(&doc, &self.config.listing_url)?;
            (products, parser::last_page(&doc))
        };

        info!(
            pages_total,
            concurrency = self.config.concurrency,
            first_page_products = products.len(),
            "starting paginated scrape"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency as usize));
        let mut handles = Vec::new();

        for page in 2..=pages_total {
            let client = self.client.clone();
            let url = self.page_url(page);
            let base = self.config.listing_url.clone();
            let sem = semaphore.clone();

            handles.push(tokio::spawn(async move {
                let _permit = sem.acquire().await.expect("semaphore closed");
                debug!(%url, page, "fetching listing page");
                fetch_page(&client, &url, &base).await
            }));
        }

        // Join in spawn order so products stay in page order.
        let mut pages_failed = 0u32;
        for (handle, page) in handles.into_iter().zip(2..) {
            match handle.await {
                Ok(Ok(page_products)) => products.extend(page_products),
                Ok(Err(e)) => {
                    warn!(page, error = %e, "page failed, treating as empty");
                    pages_failed += 1;
                }
                Err(e) => {
                    warn!(page, error = %e, "page task panicked, treating as empty");
                    pages_failed += 1;
                }
            }
        }

        info!(
            products = products.len(),
            pages_total, pages_failed, "scrape completed"
        );

        Ok(ScrapeOutcome {
            products,
            pages_total,
            pages_failed,
        })
    }

    /// Listing URL for the given page number.
    fn page_url(&self, page: u32) -> Url {
        let mut url = self.config.listing_url.clone();
        url.query_pairs_mut()
            .append_pair(&self.config.page_param, &page.to_string());
        url
    }
}

/// Fetch one listing page and extract its products.
async fn fetch_page(client: &Client, url: &Url, base: &Url) -> Result<Vec<Product>> {
    let body = fetch_text(client, url.as_str()).await?;
    let doc = Html::parse_document(&body);
    parser::parse_products(&doc, base)
}

/// GET a URL and return the response body, failing on non-2xx status.
async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ShelfwatchError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ShelfwatchError::Network(format!("{url}: HTTP {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| ShelfwatchError::Network(format!("{url}: body read failed: {e}")))
}

#[cfg(test)]
mod fetcher_tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LISTING_PATH: &str = "/collections/newarrival";

    fn pagination(last: u32) -> String {
        format!(
            r#"<div class="pagination__nav">
                <a href="{LISTING_PATH}?page={last}" data-page="{last}">{last}</a>
            </div>"#
        )
    }

    fn product_list(names: &[(&str, &str)]) -> String {
        let items: String = names
            .iter()
            .map(|(title, slug)| {
                format!(
                    r#"<div class="product-item">
                        <a class="product-item__title" href="/products/{slug}">{title}</a>
                    </div>"#
                )
            })
            .collect();
        format!(r#"<div class="product-list product-list--collection">{items}</div>"#)
    }

    fn test_config(server: &MockServer, concurrency: u32) -> ScrapeConfig {
        ScrapeConfig {
            listing_url: Url::parse(&format!("{}{LISTING_PATH}", server.uri())).unwrap(),
            concurrency,
            timeout_secs: 5,
            page_param: "page".into(),
        }
    }

    #[tokio::test]
    async fn concatenates_pages_in_order() {
        let server = MockServer::start().await;

        let page1 = format!(
            "{}{}",
            pagination(2),
            product_list(&[("商品A", "item1"), ("商品B", "item2")])
        );
        let page2 = product_list(&[("商品C", "item3"), ("商品D", "item4")]);

        Mock::given(method("GET"))
            .and(path(LISTING_PATH))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page2))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(LISTING_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(page1))
            .mount(&server)
            .await;

        let scraper = Scraper::new(test_config(&server, 5)).unwrap();
        let outcome = scraper.fetch_new_arrivals().await.unwrap();

        assert_eq!(outcome.pages_total, 2);
        assert_eq!(outcome.pages_failed, 0);
        let titles: Vec<&str> = outcome.products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["商品A", "商品B", "商品C", "商品D"]);
        // Links resolved against the listing origin
        assert!(outcome.products[0].link.starts_with(&server.uri()));
    }

    #[tokio::test]
    async fn single_page_listing_needs_one_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(LISTING_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(product_list(&[("商品A", "item1"), ("商品B", "item2")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let scraper = Scraper::new(test_config(&server, 5)).unwrap();
        let outcome = scraper.fetch_new_arrivals().await.unwrap();

        assert_eq!(outcome.pages_total, 1);
        assert_eq!(outcome.products.len(), 2);
    }

    #[tokio::test]
    async fn failed_page_is_skipped() {
        let server = MockServer::start().await;

        let page1 = format!("{}{}", pagination(3), product_list(&[("商品A", "item1")]));
        let page3 = product_list(&[("商品E", "item5")]);

        Mock::given(method("GET"))
            .and(path(LISTING_PATH))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(LISTING_PATH))
            .and(query_param("page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page3))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(LISTING_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(page1))
            .mount(&server)
            .await;

        let scraper = Scraper::new(test_config(&server, 2)).unwrap();
        let outcome = scraper.fetch_new_arrivals().await.unwrap();

        assert_eq!(outcome.pages_total, 3);
        assert_eq!(outcome.pages_failed, 1);
        let titles: Vec<&str> = outcome.products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["商品A", "商品E"]);
    }

    #[tokio::test]
    async fn first_page_failure_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(LISTING_PATH))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let scraper = Scraper::new(test_config(&server, 5)).unwrap();
        let result = scraper.fetch_new_arrivals().await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("503"));
    }
}
