use std::time::Duration;

use async_trait::async_trait;
use common::config::PrimaryConfig;
use common::ProviderError;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::{transport_error, ProviderRequest, RecommendationProvider};

/// Scrape-backed recommendation backend.
pub struct ScrapeProvider {
    client: Client,
    url: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct RecommendBody<'a> {
    url: &'a str,
    device: &'a str,
    refresh: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    share_text: Option<&'a str>,
}

impl ScrapeProvider {
    pub fn new(config: &PrimaryConfig) -> Result<Self, ProviderError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NetworkFailure(e.to_string()))?;

        Ok(Self {
            client,
            url: join_url(&config.base_url, &config.recommend_path),
            timeout,
        })
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[async_trait]
impl RecommendationProvider for ScrapeProvider {
    fn name(&self) -> &str {
        "primary"
    }

    #[instrument(skip(self, request), fields(request_id = %request.request_id))]
    async fn fetch(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        let body = RecommendBody {
            url: &request.reference.canonical_url,
            device: &request.device,
            refresh: request.refresh,
            share_text: request.share_text.as_deref(),
        };

        debug!("POST {} for {}", self.url, request.reference.canonical_url);
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("primary returned HTTP {}", status.as_u16());
            return Err(ProviderError::UpstreamError {
                status: status.as_u16(),
                body,
            });
        }

        response
            .text()
            .await
            .map_err(|e| transport_error(e, self.timeout))
    }
}
