use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::config::{PolicyConfig, SecondaryConfig};
use common::ProviderError;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::prompt::{build_prompt, detect_category};
use crate::rate_limit::RateLimiter;
use crate::{transport_error, ProviderRequest, RecommendationProvider};

/// One generateContent call with a given credential.
#[async_trait]
pub trait GenerateContent: Send + Sync {
    async fn generate_content(&self, api_key: &str, payload: &Value)
        -> Result<String, ProviderError>;
}

/// generateContent over HTTPS.
pub struct HttpGenerateContent {
    client: Client,
    url: String,
    request_timeout: Duration,
}

impl HttpGenerateContent {
    pub fn new(config: &SecondaryConfig) -> Result<Self, ProviderError> {
        let request_timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ProviderError::NetworkFailure(e.to_string()))?;
        Ok(Self {
            client,
            url: format!(
                "{}/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            request_timeout,
        })
    }
}

#[async_trait]
impl GenerateContent for HttpGenerateContent {
    async fn generate_content(
        &self,
        api_key: &str,
        payload: &Value,
    ) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| transport_error(e, self.request_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedPayload(e.to_string()))?;
        extract_candidate_text(&body)
    }
}

/// AI-only recommendation provider backed by the Gemini generateContent API.
///
/// Retries overload responses with exponential backoff, and rotates to the
/// next credential on quota errors. The two budgets are independent: a
/// rotation never consumes a backoff attempt.
pub struct GeminiProvider {
    transport: Arc<dyn GenerateContent>,
    api_keys: Vec<String>,
    current_key: AtomicUsize,
    max_attempts: u32,
    base_backoff: Duration,
    temperature: f64,
    max_output_tokens: u32,
    limiter: RateLimiter,
    min_items: usize,
    max_items: usize,
    default_category: String,
}

impl GeminiProvider {
    pub fn new(config: &SecondaryConfig, policy: &PolicyConfig) -> Result<Self, ProviderError> {
        let transport = HttpGenerateContent::new(config)?;
        Ok(Self::with_transport(Arc::new(transport), config, policy))
    }

    pub fn with_transport(
        transport: Arc<dyn GenerateContent>,
        config: &SecondaryConfig,
        policy: &PolicyConfig,
    ) -> Self {
        Self {
            transport,
            api_keys: config.api_keys.clone(),
            current_key: AtomicUsize::new(0),
            max_attempts: config.max_attempts.max(1),
            base_backoff: Duration::from_millis(config.base_backoff_ms),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            limiter: RateLimiter::per_minute(config.requests_per_minute),
            min_items: policy.min_accepted,
            max_items: policy.max_accepted,
            default_category: policy.default_category.clone(),
        }
    }

    /// Index of the credential currently in use.
    pub fn active_key_index(&self) -> usize {
        self.current_key.load(Ordering::SeqCst)
    }

    /// Advance to the next credential if one remains. Only the caller that
    /// observed `from` as current performs the move.
    fn rotate_key(&self, from: usize) -> bool {
        if from + 1 >= self.api_keys.len() {
            return false;
        }
        match self
            .current_key
            .compare_exchange(from, from + 1, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => true,
            // Someone else already rotated; retry with whatever is current.
            Err(current) => current != from,
        }
    }

    fn payload(&self, prompt: &str) -> Value {
        json!({
            "contents": [
                { "role": "user", "parts": [{ "text": prompt }] }
            ],
            "generationConfig": {
                "temperature": self.temperature,
                "topP": 0.95,
                "topK": 40,
                "maxOutputTokens": self.max_output_tokens
            },
            "safetySettings": [
                { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_NONE" },
                { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_NONE" },
                { "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "BLOCK_NONE" },
                { "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_NONE" }
            ]
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        if self.api_keys.is_empty() {
            return Err(ProviderError::QuotaExceeded(
                "no API credentials configured".into(),
            ));
        }

        let payload = self.payload(prompt);
        let mut attempt = 0u32;
        loop {
            self.limiter.wait().await;

            let key_index = self.active_key_index();
            let Some(api_key) = self.api_keys.get(key_index) else {
                return Err(ProviderError::QuotaExceeded(
                    "credential pool exhausted".into(),
                ));
            };

            debug!(
                "generateContent attempt {}/{} with key {}/{}",
                attempt + 1,
                self.max_attempts,
                key_index + 1,
                self.api_keys.len()
            );

            match self.transport.generate_content(api_key, &payload).await {
                Ok(text) => return Ok(text),
                Err(ProviderError::QuotaExceeded(msg)) => {
                    if self.rotate_key(key_index) {
                        warn!(
                            "quota exhausted on key {}/{}; rotating",
                            key_index + 1,
                            self.api_keys.len()
                        );
                        continue;
                    }
                    return Err(ProviderError::QuotaExceeded(msg));
                }
                Err(e) if e.is_transient_overload() && attempt + 1 < self.max_attempts => {
                    let delay = self.base_backoff * 2u32.saturating_pow(attempt);
                    attempt += 1;
                    warn!(
                        "secondary overloaded ({}); retrying in {:?} (attempt {}/{})",
                        e, delay, attempt + 1, self.max_attempts
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Map a non-2xx generateContent response into the provider taxonomy.
fn classify_status(status: u16, body: String) -> ProviderError {
    let lowered = body.to_ascii_lowercase();
    if status == 429 || lowered.contains("resource_exhausted") || lowered.contains("quota") {
        ProviderError::QuotaExceeded(format!("HTTP {status}"))
    } else if status == 503 || lowered.contains("overloaded") {
        ProviderError::UpstreamError { status: 503, body }
    } else {
        ProviderError::UpstreamError { status, body }
    }
}

/// Pull the generated text out of a generateContent response body.
///
/// A prompt-level block, a missing candidate list, or a `SAFETY` finish
/// reason are content-policy refusals. A `MAX_TOKENS` finish still yields
/// whatever text was produced.
pub fn extract_candidate_text(body: &Value) -> Result<String, ProviderError> {
    if let Some(reason) = body
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(|r| r.as_str())
    {
        return Err(ProviderError::SafetyBlocked(reason.to_string()));
    }

    let candidate = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| ProviderError::SafetyBlocked("no response candidates".into()))?;

    let finish_reason = candidate
        .get("finishReason")
        .and_then(|r| r.as_str())
        .unwrap_or("UNSPECIFIED");
    if finish_reason == "SAFETY" {
        return Err(ProviderError::SafetyBlocked(finish_reason.to_string()));
    }
    if finish_reason == "MAX_TOKENS" {
        warn!("secondary response hit MAX_TOKENS; extracting partial text");
    }

    let text: String = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::MalformedPayload(format!(
            "empty response text (finish_reason: {finish_reason})"
        )));
    }
    Ok(text)
}

#[async_trait]
impl RecommendationProvider for GeminiProvider {
    fn name(&self) -> &str {
        "secondary"
    }

    #[instrument(skip(self, request), fields(request_id = %request.request_id))]
    async fn fetch(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        let title = request
            .title_hint
            .as_deref()
            .unwrap_or(&request.reference.raw_text);
        let category = detect_category(title, &self.default_category);
        info!("secondary prompt: category={} title={:.60}", category, title);

        let prompt = build_prompt(
            title,
            &category,
            &request.reference.canonical_url,
            self.min_items,
            self.max_items,
        );
        self.generate(&prompt).await
    }
}
