//! Recommendation provider clients.
//!
//! Both providers implement [`RecommendationProvider`] and return the raw
//! response body; shape validation happens in the engine.

pub mod prompt;
pub mod rate_limit;

mod primary;
mod secondary;

use std::time::Duration;

use async_trait::async_trait;
use common::{ProductReference, ProviderError};
use uuid::Uuid;

pub use primary::ScrapeProvider;
pub use prompt::{build_prompt, detect_category};
pub use rate_limit::RateLimiter;
pub use secondary::{
    extract_candidate_text, GeminiProvider, GenerateContent, HttpGenerateContent,
};

/// Everything a provider needs to produce recommendations for one reference.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub request_id: Uuid,
    pub reference: ProductReference,
    pub device: String,
    pub refresh: bool,
    /// Caller-supplied share text, forwarded verbatim.
    pub share_text: Option<String>,
    /// Best product-name guess derived from the share text or URL slug.
    pub title_hint: Option<String>,
}

/// A source of recommendation payloads.
#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    /// Short label used in logs and journals.
    fn name(&self) -> &str;

    /// Fetch the raw payload for a reference. The body is returned
    /// unparsed so that every provider goes through the same validator.
    async fn fetch(&self, request: &ProviderRequest) -> Result<String, ProviderError>;
}

/// Map a transport-level reqwest failure into the provider taxonomy.
pub(crate) fn transport_error(err: reqwest::Error, bound: Duration) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(bound)
    } else if err.is_decode() || err.is_body() {
        ProviderError::MalformedPayload(err.to_string())
    } else {
        ProviderError::NetworkFailure(err.to_string())
    }
}
