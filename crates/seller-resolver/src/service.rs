//! Live cross-marketplace search service.

use std::time::Duration;

use async_trait::async_trait;
use common::config::SellerConfig;
use common::ProviderError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Outgoing search request.
#[derive(Debug, Clone, Serialize)]
pub struct SellerQuery {
    pub product_name: String,
    pub brand: String,
    pub current_platform: String,
}

/// One seller as reported by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSeller {
    pub platform: String,
    pub url: String,
    /// Usually a display string; some backends send a bare number.
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceResponse {
    #[serde(default)]
    pub sellers: Vec<ServiceSeller>,
    #[serde(default)]
    pub total_found: Option<usize>,
}

impl ServiceSeller {
    pub fn price_text(&self) -> Option<String> {
        match self.price.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// A live seller search backend.
#[async_trait]
pub trait SellerSearch: Send + Sync {
    async fn search(&self, query: &SellerQuery) -> Result<ServiceResponse, ProviderError>;
}

/// HTTP client for the multi-platform search endpoint.
pub struct HttpSellerSearch {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpSellerSearch {
    pub fn new(config: &SellerConfig) -> Result<Self, ProviderError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NetworkFailure(e.to_string()))?;
        Ok(Self {
            client,
            url: config.service_url.clone(),
            timeout,
        })
    }

    fn map_transport(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else if err.is_decode() {
            ProviderError::MalformedPayload(err.to_string())
        } else {
            ProviderError::NetworkFailure(err.to_string())
        }
    }
}

#[async_trait]
impl SellerSearch for HttpSellerSearch {
    async fn search(&self, query: &SellerQuery) -> Result<ServiceResponse, ProviderError> {
        debug!("POST {} for {:?}", self.url, query.product_name);
        let response = self
            .client
            .post(&self.url)
            .json(query)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::UpstreamError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| self.map_transport(e))?;
        parse_response(&body)
    }
}

pub fn parse_response(body: &str) -> Result<ServiceResponse, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::MalformedPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_response() {
        let body = r#"{
            "sellers": [
                {"platform": "Flipkart", "url": "https://www.flipkart.com/x/p/itm1", "price": "₹1,299", "available": true, "icon": "🛒"},
                {"platform": "Meesho", "url": "https://www.meesho.com/search?q=Realme", "price": null},
                {"platform": "Snapdeal", "url": "https://www.snapdeal.com/search?keyword=Realme", "price": 1249}
            ],
            "total_found": 3,
            "query": "Realme Buds T300"
        }"#;
        let parsed = parse_response(body).expect("parses");
        assert_eq!(parsed.total_found, Some(3));
        assert_eq!(parsed.sellers[0].price_text().as_deref(), Some("₹1,299"));
        assert_eq!(parsed.sellers[1].price_text(), None);
        assert!(parsed.sellers[1].available);
        assert_eq!(parsed.sellers[2].price_text().as_deref(), Some("1249"));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            parse_response("<html>502</html>"),
            Err(ProviderError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_query_body_shape() {
        let query = SellerQuery {
            product_name: "Realme Buds T300".into(),
            brand: "Realme".into(),
            current_platform: "amazon".into(),
        };
        let value = serde_json::to_value(&query).expect("serializes");
        assert_eq!(value["product_name"], "Realme Buds T300");
        assert_eq!(value["current_platform"], "amazon");
    }
}
