//! Domain types shared across crates.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marketplace a reference (or an alternative) originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourcePlatform {
    Amazon,
    Flipkart,
    #[serde(alias = "other")]
    Unknown,
}

impl SourcePlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amazon => "amazon",
            Self::Flipkart => "flipkart",
            Self::Unknown => "unknown",
        }
    }

    /// Detect the platform from a host name or full URL.
    pub fn from_url(url: &str) -> Self {
        let lowered = url.trim().to_ascii_lowercase();
        let without_scheme = lowered
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&lowered);
        let host = without_scheme
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        if host.contains("amazon.") || host.contains("amzn.") || host == "a.co" {
            Self::Amazon
        } else if host.contains("flipkart.") || host == "fkrt.it" {
            Self::Flipkart
        } else {
            Self::Unknown
        }
    }

    /// Lenient parse of a provider-declared site tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "amazon" => Self::Amazon,
            "flipkart" => Self::Flipkart,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for SourcePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical form of whatever the user handed us. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductReference {
    pub raw_text: String,
    pub canonical_url: String,
    pub source_platform: SourcePlatform,
    pub is_synthesized: bool,
}

/// One recommended alternative product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub id: String,
    pub brand: String,
    pub model: Option<String>,
    pub title: String,
    pub image_url: String,
    pub price_estimate: String,
    /// Whole currency units.
    pub price_raw: Option<f64>,
    pub rating_estimate: Option<f64>,
    pub rating_count: Option<u64>,
    pub specs: Vec<String>,
    pub why_pick: String,
    pub tradeoffs: String,
    pub source_url: String,
    pub source_site: SourcePlatform,
}

/// Flags recorded while validating a provider payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFlags {
    /// Which extraction strategy produced the JSON document.
    pub extraction: String,
    /// Provider omitted `category` and the default label was used.
    pub category_defaulted: bool,
    /// Entries dropped for missing required fields.
    pub dropped_entries: usize,
    /// Entries dropped beyond the accepted maximum.
    pub truncated_entries: usize,
}

/// A fully validated recommendation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub reference: ProductReference,
    pub category: String,
    pub alternatives: Vec<Alternative>,
    pub warnings: BTreeSet<String>,
    pub validation: ValidationFlags,
    pub query_time: DateTime<Utc>,
}

/// Which stage produced the result handed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrigin {
    Cache,
    Primary,
    Secondary,
}

impl ResultOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

/// Inbound request from the UI layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub reference: String,
    pub device_platform: String,
    #[serde(default)]
    pub force_refresh: bool,
    #[serde(default)]
    pub disambiguating_text: Option<String>,
}

/// Whether a seller link points at a product page or a search page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Direct,
    Search,
}

/// One marketplace link for a resolved product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerLink {
    pub platform: String,
    pub url: String,
    pub price: Option<String>,
    pub available: bool,
    pub kind: LinkKind,
}
