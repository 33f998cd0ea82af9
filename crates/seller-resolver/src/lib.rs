//! Cross-marketplace seller resolution.
//!
//! Asks the live search service first. When it is unreachable, slow, or
//! answers with garbage, a deterministic set of marketplace search links is
//! built from the registry instead. `resolve` never fails.

pub mod link_kind;
pub mod registry;
pub mod service;

use std::sync::Arc;
use std::time::Duration;

use common::config::SellerConfig;
use common::{ProviderError, SellerLink};
use serde::Serialize;
use tracing::{info, warn};

pub use link_kind::classify;
pub use registry::{search_query, MarketplaceRegistry};
pub use service::{HttpSellerSearch, SellerQuery, SellerSearch, ServiceResponse};

/// Where a lookup's links came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupSource {
    Live,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerLookup {
    pub sellers: Vec<SellerLink>,
    pub total_found: usize,
    pub source: LookupSource,
    /// Why the live service was not used, for fallback lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl SellerLookup {
    /// No other marketplace carries the product. A valid outcome, not an
    /// error.
    pub fn is_exclusive(&self) -> bool {
        self.sellers.is_empty()
    }
}

pub struct SellerResolver {
    service: Arc<dyn SellerSearch>,
    registry: MarketplaceRegistry,
    timeout: Duration,
}

impl SellerResolver {
    pub fn new(
        service: Arc<dyn SellerSearch>,
        registry: MarketplaceRegistry,
        timeout: Duration,
    ) -> Self {
        Self {
            service,
            registry,
            timeout,
        }
    }

    pub fn from_config(config: &SellerConfig) -> Result<Self, ProviderError> {
        Ok(Self::new(
            Arc::new(HttpSellerSearch::new(config)?),
            MarketplaceRegistry::new(config.marketplaces.clone()),
            Duration::from_secs(config.timeout_secs),
        ))
    }

    pub async fn resolve(
        &self,
        product_name: &str,
        brand: &str,
        current_platform: &str,
    ) -> SellerLookup {
        let query = SellerQuery {
            product_name: product_name.trim().to_string(),
            brand: brand.trim().to_string(),
            current_platform: current_platform.trim().to_ascii_lowercase(),
        };

        let outcome = tokio::time::timeout(self.timeout, self.service.search(&query))
            .await
            .unwrap_or(Err(ProviderError::Timeout(self.timeout)));

        match outcome {
            Ok(response) => {
                let sellers: Vec<SellerLink> = response
                    .sellers
                    .iter()
                    .map(|s| SellerLink {
                        platform: s.platform.clone(),
                        url: s.url.clone(),
                        price: s.price_text(),
                        available: s.available,
                        kind: classify(&s.url),
                    })
                    .collect();
                let total_found = response.total_found.unwrap_or(sellers.len());
                info!(
                    "live seller search for {:?}: {} sellers",
                    query.product_name,
                    sellers.len()
                );
                SellerLookup {
                    sellers,
                    total_found,
                    source: LookupSource::Live,
                    fallback_reason: None,
                }
            }
            Err(err) => {
                warn!(
                    "seller service unavailable ({}), using marketplace search links: {}",
                    err.code(),
                    err
                );
                let sellers = self.registry.fallback_links(
                    &query.product_name,
                    &query.brand,
                    &query.current_platform,
                );
                SellerLookup {
                    total_found: sellers.len(),
                    sellers,
                    source: LookupSource::Fallback,
                    fallback_reason: Some(err.to_string()),
                }
            }
        }
    }
}
