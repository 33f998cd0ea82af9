//! Recommendation orchestration.
//!
//! One logical task per call: cache check, then the Primary provider, then
//! the Secondary provider, each validated the same way. Providers are tried
//! strictly in sequence, never raced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{
    AppConfig, ProviderError, RecommendError, RecommendRequest, RecommendationResult, ResultOrigin,
};
use dashmap::DashMap;
use provider_client::{ProviderRequest, RecommendationProvider};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::cache::{cache_key, ResultCache};
use crate::normalizer::{normalize, title_hint};
use crate::validator::ResponseValidator;

/// Orchestration states, recorded in the order they were entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CacheCheck,
    PrimaryFetch,
    PrimaryValidate,
    SecondaryFetch,
    SecondaryValidate,
    Success,
    Failed,
}

/// A successful orchestration.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub request_id: Uuid,
    pub result: RecommendationResult,
    pub origin: ResultOrigin,
    /// Why the Primary stage fell through, when the result came from the
    /// Secondary provider.
    pub primary_failure: Option<ProviderError>,
    pub stages: Vec<Stage>,
    pub elapsed: Duration,
}

struct InFlight {
    ticket: u64,
    token: CancellationToken,
}

pub struct Orchestrator {
    primary: Arc<dyn RecommendationProvider>,
    secondary: Arc<dyn RecommendationProvider>,
    cache: Arc<ResultCache>,
    validator: ResponseValidator,
    primary_timeout: Duration,
    secondary_timeout: Duration,
    in_flight: DashMap<String, InFlight>,
    next_ticket: AtomicU64,
}

impl Orchestrator {
    pub fn new(
        primary: Arc<dyn RecommendationProvider>,
        secondary: Arc<dyn RecommendationProvider>,
        cache: Arc<ResultCache>,
        config: &AppConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            cache,
            validator: ResponseValidator::new(&config.policy),
            primary_timeout: Duration::from_secs(config.primary.timeout_secs),
            secondary_timeout: Duration::from_secs(config.secondary.timeout_secs),
            in_flight: DashMap::new(),
            next_ticket: AtomicU64::new(1),
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Produce a validated result for one request.
    ///
    /// `cancel` lets the caller abandon the call. A newer call for the same
    /// reference also cancels this one; the newest caller always wins.
    #[instrument(skip_all, fields(request_id = tracing::field::Empty))]
    pub async fn recommend(
        &self,
        request: &RecommendRequest,
        cancel: CancellationToken,
    ) -> Result<Recommendation, RecommendError> {
        let started = Instant::now();
        let request_id = Uuid::new_v4();
        tracing::Span::current().record("request_id", tracing::field::display(request_id));
        let reference = normalize(&request.reference);
        let key = cache_key(&reference);
        let disambiguating = request
            .disambiguating_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        info!(
            "[{}] recommend {} (platform={}, synthesized={}, refresh={})",
            request_id,
            reference.canonical_url,
            reference.source_platform,
            reference.is_synthesized,
            request.force_refresh
        );

        let mut stages = Vec::with_capacity(6);

        if !request.force_refresh && disambiguating.is_none() {
            stages.push(Stage::CacheCheck);
            if let Some(result) = self.cache.get(&key) {
                stages.push(Stage::Success);
                info!("[{}] served from cache", request_id);
                return Ok(Recommendation {
                    request_id,
                    result,
                    origin: ResultOrigin::Cache,
                    primary_failure: None,
                    stages,
                    elapsed: started.elapsed(),
                });
            }
        }

        let token = cancel.child_token();
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = self.in_flight.insert(
            key.clone(),
            InFlight {
                ticket,
                token: token.clone(),
            },
        ) {
            info!("[{}] superseding in-flight request for same reference", request_id);
            previous.token.cancel();
        }

        let provider_request = ProviderRequest {
            request_id,
            title_hint: title_hint(&reference, disambiguating),
            share_text: disambiguating.map(ToString::to_string),
            reference,
            device: request.device_platform.clone(),
            refresh: request.force_refresh,
        };

        let outcome = self
            .run_providers(&provider_request, &key, &token, &mut stages)
            .await;

        self.in_flight.remove_if(&key, |_, entry| entry.ticket == ticket);

        let (result, origin, primary_failure) = outcome?;
        Ok(Recommendation {
            request_id,
            result,
            origin,
            primary_failure,
            stages,
            elapsed: started.elapsed(),
        })
    }

    async fn run_providers(
        &self,
        request: &ProviderRequest,
        key: &str,
        token: &CancellationToken,
        stages: &mut Vec<Stage>,
    ) -> Result<(RecommendationResult, ResultOrigin, Option<ProviderError>), RecommendError> {
        let id = request.request_id;

        stages.push(Stage::PrimaryFetch);
        let primary_outcome = match self
            .call(self.primary.as_ref(), self.primary_timeout, request, token)
            .await
        {
            Ok(raw) => {
                stages.push(Stage::PrimaryValidate);
                self.validator
                    .validate(&raw, &request.reference)
                    .map_err(ProviderError::from)
            }
            Err(err) => Err(err),
        };

        let primary_failure = match primary_outcome {
            Ok(result) => {
                return self
                    .finish(key, result, ResultOrigin::Primary, token, stages)
                    .map(|result| (result, ResultOrigin::Primary, None));
            }
            Err(err) if !err.is_recoverable() => {
                info!("[{}] cancelled during primary stage", id);
                return Err(RecommendError::Cancelled);
            }
            Err(err) => {
                warn!(
                    "[{}] {} failed ({}), falling back to {}: {}",
                    id,
                    self.primary.name(),
                    err.code(),
                    self.secondary.name(),
                    err
                );
                err
            }
        };

        stages.push(Stage::SecondaryFetch);
        let secondary_outcome = match self
            .call(self.secondary.as_ref(), self.secondary_timeout, request, token)
            .await
        {
            Ok(raw) => {
                stages.push(Stage::SecondaryValidate);
                self.validator
                    .validate(&raw, &request.reference)
                    .map_err(ProviderError::from)
            }
            Err(err) => Err(err),
        };

        match secondary_outcome {
            Ok(result) => self
                .finish(key, result, ResultOrigin::Secondary, token, stages)
                .map(|result| (result, ResultOrigin::Secondary, Some(primary_failure))),
            Err(ProviderError::Cancelled) => {
                info!("[{}] cancelled during secondary stage", id);
                Err(RecommendError::Cancelled)
            }
            Err(secondary) => {
                stages.push(Stage::Failed);
                warn!(
                    "[{}] both providers failed: primary={} secondary={}",
                    id,
                    primary_failure.code(),
                    secondary.code()
                );
                Err(RecommendError::Exhausted {
                    primary: primary_failure,
                    secondary,
                })
            }
        }
    }

    /// Write-through on success. A call superseded after its provider
    /// answered must not overwrite the newer caller's entry.
    fn finish(
        &self,
        key: &str,
        result: RecommendationResult,
        origin: ResultOrigin,
        token: &CancellationToken,
        stages: &mut Vec<Stage>,
    ) -> Result<RecommendationResult, RecommendError> {
        if token.is_cancelled() {
            return Err(RecommendError::Cancelled);
        }
        stages.push(Stage::Success);
        self.cache.put(key, result.clone());
        debug!(
            "cached {} alternatives from {}",
            result.alternatives.len(),
            origin.as_str()
        );
        Ok(result)
    }

    /// One bounded, cancellable provider call. Expiry is reported as
    /// `Timeout` and is never retried here.
    async fn call(
        &self,
        provider: &dyn RecommendationProvider,
        bound: Duration,
        request: &ProviderRequest,
        token: &CancellationToken,
    ) -> Result<String, ProviderError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(ProviderError::Cancelled),
            outcome = tokio::time::timeout(bound, provider.fetch(request)) => {
                outcome.unwrap_or(Err(ProviderError::Timeout(bound)))
            }
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("primary", &self.primary.name())
            .field("secondary", &self.secondary.name())
            .field("primary_timeout", &self.primary_timeout)
            .field("secondary_timeout", &self.secondary_timeout)
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::SourcePlatform;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[derive(Clone)]
    enum Script {
        Respond(String),
        Fail(ProviderError),
        Hang,
    }

    /// Provider that replays scripted outcomes in order, repeating the last.
    struct FakeProvider {
        name: &'static str,
        scripts: Mutex<VecDeque<Script>>,
        calls: AtomicUsize,
        seen: Mutex<Vec<ProviderRequest>>,
    }

    impl FakeProvider {
        fn new(name: &'static str, scripts: Vec<Script>) -> Arc<Self> {
            Arc::new(Self {
                name,
                scripts: Mutex::new(scripts.into()),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_request(&self) -> Option<ProviderRequest> {
            self.seen.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl RecommendationProvider for FakeProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.clone());
            let script = {
                let mut scripts = self.scripts.lock().unwrap();
                if scripts.len() > 1 {
                    scripts.pop_front()
                } else {
                    scripts.front().cloned()
                }
            };
            match script {
                Some(Script::Respond(body)) => Ok(body),
                Some(Script::Fail(err)) => Err(err),
                Some(Script::Hang) | None => std::future::pending().await,
            }
        }
    }

    fn payload(category: &str, count: usize) -> String {
        let alternatives: Vec<_> = (1..=count)
            .map(|i| {
                json!({
                    "id": i.to_string(),
                    "brand": "boAt",
                    "title": format!("boAt Airdopes {i}"),
                    "price_raw": 999 + i,
                    "source_url": format!("https://www.amazon.in/dp/B0{i}"),
                    "source_site": "amazon"
                })
            })
            .collect();
        json!({ "category": category, "alternatives": alternatives }).to_string()
    }

    fn request(reference: &str) -> RecommendRequest {
        RecommendRequest {
            reference: reference.into(),
            device_platform: "android".into(),
            ..RecommendRequest::default()
        }
    }

    fn orchestrator(
        primary: &Arc<FakeProvider>,
        secondary: &Arc<FakeProvider>,
    ) -> Orchestrator {
        let config = AppConfig::default();
        Orchestrator::new(
            primary.clone(),
            secondary.clone(),
            Arc::new(ResultCache::from_config(&config.cache)),
            &config,
        )
    }

    const URL: &str = "https://www.amazon.in/dp/B000TEST";

    #[tokio::test(start_paused = true)]
    async fn test_primary_timeout_falls_back_to_secondary() {
        let primary = FakeProvider::new("primary", vec![Script::Hang]);
        let secondary = FakeProvider::new(
            "secondary",
            vec![Script::Respond(format!("```json\n{}\n```", payload("earbuds", 3)))],
        );
        let orch = orchestrator(&primary, &secondary);

        let rec = orch
            .recommend(&request(URL), CancellationToken::new())
            .await
            .expect("secondary result");

        assert_eq!(rec.origin, ResultOrigin::Secondary);
        assert_eq!(rec.result.alternatives.len(), 3);
        assert_eq!(rec.result.category, "earbuds");
        assert_eq!(
            rec.primary_failure,
            Some(ProviderError::Timeout(Duration::from_secs(150)))
        );
        assert_eq!(
            rec.stages,
            vec![
                Stage::CacheCheck,
                Stage::PrimaryFetch,
                Stage::SecondaryFetch,
                Stage::SecondaryValidate,
                Stage::Success
            ]
        );
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);

        let cached = orch.cache().get(&cache_key(&normalize(URL))).expect("cached");
        assert_eq!(cached.alternatives.len(), 3);
    }

    #[tokio::test]
    async fn test_fresh_cache_hit_makes_no_provider_calls() {
        let primary = FakeProvider::new("primary", vec![Script::Respond(payload("earbuds", 4))]);
        let secondary = FakeProvider::new("secondary", vec![Script::Hang]);
        let orch = orchestrator(&primary, &secondary);

        let first = orch
            .recommend(&request(URL), CancellationToken::new())
            .await
            .expect("primary result");
        assert_eq!(first.origin, ResultOrigin::Primary);

        let second = orch
            .recommend(&request(URL), CancellationToken::new())
            .await
            .expect("cache hit");
        assert_eq!(second.origin, ResultOrigin::Cache);
        assert_eq!(second.stages, vec![Stage::CacheCheck, Stage::Success]);
        assert_eq!(second.result, first.result);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_cache_entry_refetches() {
        let primary = FakeProvider::new("primary", vec![Script::Respond(payload("earbuds", 2))]);
        let secondary = FakeProvider::new("secondary", vec![Script::Hang]);
        let orch = orchestrator(&primary, &secondary);

        orch.recommend(&request(URL), CancellationToken::new())
            .await
            .expect("first");
        tokio::time::advance(orch.cache().ttl()).await;
        let again = orch
            .recommend(&request(URL), CancellationToken::new())
            .await
            .expect("second");

        assert_eq!(again.origin, ResultOrigin::Primary);
        assert_eq!(primary.calls(), 2);
    }

    #[tokio::test]
    async fn test_force_refresh_skips_cache_and_writes_through() {
        let primary = FakeProvider::new(
            "primary",
            vec![
                Script::Respond(payload("earbuds", 2)),
                Script::Respond(payload("headphones", 5)),
            ],
        );
        let secondary = FakeProvider::new("secondary", vec![Script::Hang]);
        let orch = orchestrator(&primary, &secondary);

        orch.recommend(&request(URL), CancellationToken::new())
            .await
            .expect("first");

        let mut refresh = request(URL);
        refresh.force_refresh = true;
        let rec = orch
            .recommend(&refresh, CancellationToken::new())
            .await
            .expect("refresh");

        assert_eq!(rec.origin, ResultOrigin::Primary);
        assert!(!rec.stages.contains(&Stage::CacheCheck));
        assert!(primary.last_request().map(|r| r.refresh).unwrap_or(false));
        let cached = orch.cache().get(&cache_key(&normalize(URL))).expect("cached");
        assert_eq!(cached.category, "headphones");
        assert_eq!(cached.alternatives.len(), 5);
    }

    #[tokio::test]
    async fn test_disambiguating_text_skips_cache() {
        let primary = FakeProvider::new("primary", vec![Script::Respond(payload("earbuds", 2))]);
        let secondary = FakeProvider::new("secondary", vec![Script::Hang]);
        let orch = orchestrator(&primary, &secondary);

        orch.recommend(&request(URL), CancellationToken::new())
            .await
            .expect("first");

        let mut with_text = request(URL);
        with_text.disambiguating_text =
            Some("Deal: boAt Airdopes 141 Bluetooth TWS Earbuds".into());
        let rec = orch
            .recommend(&with_text, CancellationToken::new())
            .await
            .expect("second");

        assert_eq!(rec.origin, ResultOrigin::Primary);
        assert_eq!(primary.calls(), 2);
        let sent = primary.last_request().expect("request");
        assert_eq!(
            sent.share_text.as_deref(),
            Some("Deal: boAt Airdopes 141 Bluetooth TWS Earbuds")
        );
        assert_eq!(
            sent.title_hint.as_deref(),
            Some("boAt Airdopes 141 Bluetooth TWS Earbuds")
        );
    }

    #[tokio::test]
    async fn test_insufficient_primary_invokes_secondary_once() {
        let primary = FakeProvider::new("primary", vec![Script::Respond(payload("earbuds", 1))]);
        let secondary =
            FakeProvider::new("secondary", vec![Script::Respond(payload("earbuds", 2))]);
        let orch = orchestrator(&primary, &secondary);

        let rec = orch
            .recommend(&request(URL), CancellationToken::new())
            .await
            .expect("secondary result");

        assert_eq!(rec.origin, ResultOrigin::Secondary);
        assert_eq!(secondary.calls(), 1);
        assert_eq!(
            rec.primary_failure,
            Some(ProviderError::InsufficientResults {
                found: 1,
                required: 2
            })
        );
        assert!(rec.stages.contains(&Stage::PrimaryValidate));
    }

    #[tokio::test]
    async fn test_oversized_result_is_truncated() {
        let max = AppConfig::default().policy.max_accepted;
        let primary =
            FakeProvider::new("primary", vec![Script::Respond(payload("earbuds", max + 3))]);
        let secondary = FakeProvider::new("secondary", vec![Script::Hang]);
        let orch = orchestrator(&primary, &secondary);

        let rec = orch
            .recommend(&request(URL), CancellationToken::new())
            .await
            .expect("primary result");
        assert_eq!(rec.result.alternatives.len(), max);
        assert_eq!(rec.result.validation.truncated_entries, 3);
    }

    #[tokio::test]
    async fn test_recoverable_primary_failures_fall_through() {
        let failures = vec![
            ProviderError::NetworkFailure("connection refused".into()),
            ProviderError::UpstreamError {
                status: 502,
                body: "bad gateway".into(),
            },
            ProviderError::SafetyBlocked("SAFETY".into()),
        ];
        for failure in failures {
            let primary = FakeProvider::new("primary", vec![Script::Fail(failure.clone())]);
            let secondary =
                FakeProvider::new("secondary", vec![Script::Respond(payload("earbuds", 2))]);
            let orch = orchestrator(&primary, &secondary);

            let rec = orch
                .recommend(&request(URL), CancellationToken::new())
                .await
                .expect("secondary result");
            assert_eq!(rec.origin, ResultOrigin::Secondary);
            assert_eq!(rec.primary_failure, Some(failure));
        }

        let primary = FakeProvider::new("primary", vec![Script::Respond("<html>".into())]);
        let secondary = FakeProvider::new("secondary", vec![Script::Respond(payload("earbuds", 2))]);
        let rec = orchestrator(&primary, &secondary)
            .recommend(&request(URL), CancellationToken::new())
            .await
            .expect("secondary result");
        assert!(matches!(
            rec.primary_failure,
            Some(ProviderError::MalformedPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_both_failures_surface_as_one_aggregate() {
        let primary = FakeProvider::new(
            "primary",
            vec![Script::Fail(ProviderError::UpstreamError {
                status: 500,
                body: String::new(),
            })],
        );
        let secondary = FakeProvider::new(
            "secondary",
            vec![Script::Fail(ProviderError::SafetyBlocked("SAFETY".into()))],
        );
        let orch = orchestrator(&primary, &secondary);

        let err = orch
            .recommend(&request(URL), CancellationToken::new())
            .await
            .expect_err("exhausted");
        assert_eq!(
            err,
            RecommendError::Exhausted {
                primary: ProviderError::UpstreamError {
                    status: 500,
                    body: String::new()
                },
                secondary: ProviderError::SafetyBlocked("SAFETY".into()),
            }
        );
        assert_eq!(secondary.calls(), 1);
        assert!(orch.cache().is_empty());
        assert!(orch.cache().recent().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_secondary_payload_is_terminal() {
        let primary = FakeProvider::new("primary", vec![Script::Respond(payload("earbuds", 0))]);
        let secondary = FakeProvider::new(
            "secondary",
            vec![Script::Respond("Sorry, I can't find alternatives.".into())],
        );
        let orch = orchestrator(&primary, &secondary);

        let err = orch
            .recommend(&request(URL), CancellationToken::new())
            .await
            .expect_err("exhausted");
        assert!(matches!(
            err,
            RecommendError::Exhausted {
                secondary: ProviderError::MalformedPayload(_),
                ..
            }
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_secondary_timeout_is_bounded() {
        let primary = FakeProvider::new("primary", vec![Script::Hang]);
        let secondary = FakeProvider::new("secondary", vec![Script::Hang]);
        let orch = orchestrator(&primary, &secondary);

        let err = orch
            .recommend(&request(URL), CancellationToken::new())
            .await
            .expect_err("exhausted");
        assert_eq!(
            err,
            RecommendError::Exhausted {
                primary: ProviderError::Timeout(Duration::from_secs(150)),
                secondary: ProviderError::Timeout(Duration::from_secs(60)),
            }
        );
    }

    #[tokio::test]
    async fn test_caller_cancellation_stops_the_chain() {
        let primary = FakeProvider::new("primary", vec![Script::Hang]);
        let secondary =
            FakeProvider::new("secondary", vec![Script::Respond(payload("earbuds", 2))]);
        let orch = orchestrator(&primary, &secondary);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = orch
            .recommend(&request(URL), cancel)
            .await
            .expect_err("cancelled");
        assert_eq!(err, RecommendError::Cancelled);
        assert!(!err.is_retryable());
        assert_eq!(secondary.calls(), 0);
        assert!(orch.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_request_supersedes_in_flight_one() {
        let primary = FakeProvider::new(
            "primary",
            vec![Script::Hang, Script::Respond(payload("earbuds", 2))],
        );
        let secondary =
            FakeProvider::new("secondary", vec![Script::Respond(payload("speaker", 2))]);
        let orch = Arc::new(orchestrator(&primary, &secondary));

        let mut refresh = request(URL);
        refresh.force_refresh = true;

        let first = {
            let orch = orch.clone();
            let refresh = refresh.clone();
            tokio::spawn(async move { orch.recommend(&refresh, CancellationToken::new()).await })
        };
        while primary.calls() == 0 {
            tokio::task::yield_now().await;
        }

        let second = orch
            .recommend(&refresh, CancellationToken::new())
            .await
            .expect("newest wins");
        assert_eq!(second.origin, ResultOrigin::Primary);

        let first = first.await.expect("task joins");
        assert_eq!(first.unwrap_err(), RecommendError::Cancelled);
        assert_eq!(secondary.calls(), 0);

        let cached = orch.cache().get(&cache_key(&normalize(URL))).expect("cached");
        assert_eq!(cached.category, "earbuds");
    }

    #[tokio::test]
    async fn test_free_text_runs_the_same_chain() {
        let primary = FakeProvider::new(
            "primary",
            vec![Script::Fail(ProviderError::UpstreamError {
                status: 404,
                body: String::new(),
            })],
        );
        let secondary =
            FakeProvider::new("secondary", vec![Script::Respond(payload("shoes", 3))]);
        let orch = orchestrator(&primary, &secondary);

        let rec = orch
            .recommend(&request("Nike Revolution 6"), CancellationToken::new())
            .await
            .expect("secondary result");

        let sent = primary.last_request().expect("primary saw request");
        assert!(sent.reference.is_synthesized);
        assert_eq!(
            sent.reference.canonical_url,
            "https://www.amazon.in/s?k=Nike+Revolution+6"
        );
        assert_eq!(sent.title_hint.as_deref(), Some("Nike Revolution 6"));
        assert_eq!(rec.result.reference.source_platform, SourcePlatform::Amazon);
        assert_eq!(rec.result.alternatives.len(), 3);

        let recent = orch.cache().recent();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].raw_text, "Nike Revolution 6");
    }
}
