//! Core domain types for shelfwatch.

use serde::{Deserialize, Serialize};

/// A single product extracted from a listing page.
///
/// Ephemeral — rebuilt on every run from the scraped HTML. The link is
/// always absolute, resolved against the listing URL's origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product title, whitespace-trimmed.
    pub title: String,
    /// Absolute product page URL.
    pub link: String,
}

impl Product {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_serialization() {
        let product = Product::new("商品A", "https://jp.daisonet.com/products/item1");
        let json = serde_json::to_string(&product).expect("serialize");
        let parsed: Product = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, product);
        assert!(json.contains("商品A"));
    }
}
