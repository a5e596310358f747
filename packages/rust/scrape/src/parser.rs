//! HTML extraction for new-arrivals listing pages.
//!
//! The listing markup is a Shopify collection page: a product grid
//! (`div.product-list--collection`) of `div.product-item` cards whose
//! title anchor carries both the display name and the relative product
//! link, plus a `div.pagination__nav` with `data-page` attributes on
//! the page links.

use scraper::{Html, Selector};
use url::Url;

use shelfwatch_shared::{Product, Result, ShelfwatchError};

/// Extract products from a parsed listing page.
///
/// Product links are resolved to absolute URLs against `base`. Items
/// missing a title or an href are skipped. Returns a `Parse` error if
/// the product grid itself is absent (wrong page, layout change).
pub fn parse_products(doc: &Html, base: &Url) -> Result<Vec<Product>> {
    let list_sel = Selector::parse("div.product-list.product-list--collection").unwrap();
    let item_sel = Selector::parse("div.product-item").unwrap();
    let title_sel = Selector::parse("a.product-item__title").unwrap();

    let list = doc
        .select(&list_sel)
        .next()
        .ok_or_else(|| ShelfwatchError::parse("product list not found in page"))?;

    let mut products = Vec::new();
    for item in list.select(&item_sel) {
        let Some(anchor) = item.select(&title_sel).next() else {
            continue;
        };

        let title = anchor.text().collect::<String>().trim().to_string();
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        if title.is_empty() {
            continue;
        }

        let Ok(link) = base.join(href) else {
            tracing::warn!(href, "skipping product with unresolvable link");
            continue;
        };

        products.push(Product::new(title, link.as_str()));
    }

    Ok(products)
}

/// Read the last page number from the pagination nav.
///
/// A single-page listing has no nav at all; the current page is a bare
/// `span` without `data-page`. Returns 1 when nothing parsable is found.
pub fn last_page(doc: &Html) -> u32 {
    let page_sel = Selector::parse("div.pagination__nav a[data-page]").unwrap();

    doc.select(&page_sel)
        .filter_map(|el| el.value().attr("data-page"))
        .filter_map(|p| p.parse::<u32>().ok())
        .max()
        .unwrap_or(1)
}

/// Build an image URL from a protocol-relative `data-src` template.
///
/// Shopify serves `//host/path_{width}x.jpg` style values; the scheme
/// is added and the width placeholder substituted.
pub fn image_url(data_src: &str, width: u32) -> String {
    format!("https:{}", data_src.replace("{width}", &width.to_string()))
}
