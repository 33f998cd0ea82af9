//! Application configuration types.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Device label forwarded to the Primary provider when the caller
    /// does not supply one.
    #[serde(default = "default_device")]
    pub device: String,

    /// Scrape-backed provider.
    #[serde(default)]
    pub primary: PrimaryConfig,

    /// AI-only fallback provider.
    #[serde(default)]
    pub secondary: SecondaryConfig,

    /// Cross-marketplace seller resolution.
    #[serde(default)]
    pub sellers: SellerConfig,

    /// Result-shape policy bounds.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Result cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Scrape-backed (Primary) provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryConfig {
    /// Base URL of the recommendation backend.
    #[serde(default = "default_primary_base_url")]
    pub base_url: String,

    /// Path of the recommend endpoint.
    #[serde(default = "default_recommend_path")]
    pub recommend_path: String,

    /// Bound for one multi-page scrape (seconds).
    #[serde(default = "default_primary_timeout")]
    pub timeout_secs: u64,
}

/// AI-only (Secondary) provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondaryConfig {
    /// generateContent endpoint base (model name is appended).
    #[serde(default = "default_secondary_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_secondary_model")]
    pub model: String,

    /// Credentials in rotation order. Usually filled from the environment.
    #[serde(default, skip_serializing)]
    pub api_keys: Vec<String>,

    /// Bound for the whole Secondary fetch, retries included (seconds).
    #[serde(default = "default_secondary_timeout")]
    pub timeout_secs: u64,

    /// Backoff attempts on overload responses.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First backoff delay; doubles per attempt.
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,

    /// Local cap on calls per minute, ahead of the upstream quota.
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

/// Seller resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerConfig {
    /// Live cross-marketplace search endpoint.
    #[serde(default = "default_seller_service_url")]
    pub service_url: String,

    #[serde(default = "default_seller_timeout")]
    pub timeout_secs: u64,

    /// Fallback registry, in output order.
    #[serde(default = "default_marketplaces")]
    pub marketplaces: Vec<MarketplaceTemplate>,
}

/// One entry of the fallback marketplace registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceTemplate {
    /// Display name, also matched (case-insensitively) against the
    /// current platform for exclusion.
    pub name: String,
    /// Search URL with a `{query}` placeholder.
    pub search_url: String,
}

/// Policy bounds applied by the response validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Fewer valid alternatives than this is a validation failure.
    #[serde(default = "default_min_accepted")]
    pub min_accepted: usize,

    /// Alternatives beyond this are silently dropped.
    #[serde(default = "default_max_accepted")]
    pub max_accepted: usize,

    /// Category used when a provider omits one.
    #[serde(default = "default_category")]
    pub default_category: String,
}

/// Result cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,

    #[serde(default = "default_recent_capacity")]
    pub recent_capacity: usize,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_device() -> String {
    "android".into()
}

fn default_primary_base_url() -> String {
    "http://127.0.0.1:8080".into()
}
fn default_recommend_path() -> String {
    "/recommend".into()
}
fn default_primary_timeout() -> u64 {
    150
}

fn default_secondary_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".into()
}
fn default_secondary_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_secondary_timeout() -> u64 {
    60
}
fn default_max_attempts() -> u32 {
    3
}
fn default_base_backoff_ms() -> u64 {
    2_000
}
fn default_requests_per_minute() -> u32 {
    10
}
fn default_temperature() -> f64 {
    0.5
}
fn default_max_output_tokens() -> u32 {
    8192
}

fn default_seller_service_url() -> String {
    "http://127.0.0.1:8080/multi-platform/search".into()
}
fn default_seller_timeout() -> u64 {
    60
}

fn default_marketplaces() -> Vec<MarketplaceTemplate> {
    vec![
        MarketplaceTemplate {
            name: "Amazon".into(),
            search_url: "https://www.amazon.in/s?k={query}".into(),
        },
        MarketplaceTemplate {
            name: "Flipkart".into(),
            search_url: "https://www.flipkart.com/search?q={query}".into(),
        },
        MarketplaceTemplate {
            name: "Meesho".into(),
            search_url: "https://www.meesho.com/search?q={query}".into(),
        },
        MarketplaceTemplate {
            name: "Snapdeal".into(),
            search_url: "https://www.snapdeal.com/search?keyword={query}".into(),
        },
        MarketplaceTemplate {
            name: "JioMart".into(),
            search_url: "https://www.jiomart.com/search/{query}".into(),
        },
    ]
}

fn default_min_accepted() -> usize {
    2
}
fn default_max_accepted() -> usize {
    6
}
fn default_category() -> String {
    "product".into()
}

fn default_cache_ttl() -> u64 {
    600
}
fn default_recent_capacity() -> usize {
    10
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            base_url: default_primary_base_url(),
            recommend_path: default_recommend_path(),
            timeout_secs: default_primary_timeout(),
        }
    }
}

impl Default for SecondaryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_secondary_endpoint(),
            model: default_secondary_model(),
            api_keys: Vec::new(),
            timeout_secs: default_secondary_timeout(),
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff_ms(),
            requests_per_minute: default_requests_per_minute(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl Default for SellerConfig {
    fn default() -> Self {
        Self {
            service_url: default_seller_service_url(),
            timeout_secs: default_seller_timeout(),
            marketplaces: default_marketplaces(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_accepted: default_min_accepted(),
            max_accepted: default_max_accepted(),
            default_category: default_category(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            recent_capacity: default_recent_capacity(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            primary: PrimaryConfig::default(),
            secondary: SecondaryConfig::default(),
            sellers: SellerConfig::default(),
            policy: PolicyConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let parsed: AppConfig = serde_json::from_value(serde_json::json!({
            "policy": { "min_accepted": 3 },
            "cache": { "ttl_secs": 30 }
        }))
        .expect("partial config should deserialize");

        assert_eq!(parsed.policy.min_accepted, 3);
        assert_eq!(parsed.policy.max_accepted, 6);
        assert_eq!(parsed.cache.ttl_secs, 30);
        assert_eq!(parsed.cache.recent_capacity, 10);
        assert_eq!(parsed.primary.timeout_secs, 150);
        assert_eq!(parsed.sellers.marketplaces.len(), 5);
    }

    #[test]
    fn test_default_registry_templates_have_placeholder() {
        for market in default_marketplaces() {
            assert!(market.search_url.contains("{query}"), "{}", market.name);
        }
    }
}
