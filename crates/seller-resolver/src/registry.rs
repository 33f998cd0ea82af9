//! Fallback marketplace registry.
//!
//! An open, data-driven list of marketplace search templates used when the
//! live seller service is unavailable.

use common::config::MarketplaceTemplate;
use common::{LinkKind, SellerLink};

const QUERY_PLACEHOLDER: &str = "{query}";

#[derive(Debug, Clone)]
pub struct MarketplaceRegistry {
    templates: Vec<MarketplaceTemplate>,
}

impl MarketplaceRegistry {
    pub fn new(templates: Vec<MarketplaceTemplate>) -> Self {
        Self { templates }
    }

    /// One search link per marketplace other than `current_platform`, in
    /// registry order. Same inputs, same output.
    pub fn fallback_links(
        &self,
        product_name: &str,
        brand: &str,
        current_platform: &str,
    ) -> Vec<SellerLink> {
        let query = search_query(product_name, brand);
        let current = current_platform.trim();

        self.templates
            .iter()
            .filter(|t| !t.name.eq_ignore_ascii_case(current))
            .map(|t| SellerLink {
                platform: t.name.clone(),
                url: t.search_url.replace(QUERY_PLACEHOLDER, &query),
                price: None,
                available: true,
                kind: LinkKind::Search,
            })
            .collect()
    }
}

/// `brand + product name`, encoded for a search URL. A product name that
/// already starts with the brand is not prefixed twice.
pub fn search_query(product_name: &str, brand: &str) -> String {
    let name = product_name.trim();
    let brand = brand.trim();
    let starts_with_brand = !brand.is_empty()
        && name
            .get(..brand.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(brand))
        && name[brand.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());

    let text = if brand.is_empty() || starts_with_brand {
        name.to_string()
    } else {
        format!("{brand} {name}")
    };

    text.split_whitespace()
        .map(|word| urlencoding::encode(word).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}
