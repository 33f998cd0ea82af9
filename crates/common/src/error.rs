//! Error types shared across the workspace.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Startup errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a single provider attempt (Primary, Secondary, or the seller
/// search service).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("upstream HTTP status {status}: {body}")]
    UpstreamError { status: u16, body: String },

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("insufficient results: {found} < {required}")]
    InsufficientResults { found: usize, required: usize },

    #[error("blocked by content policy: {0}")]
    SafetyBlocked(String),

    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("cancelled")]
    Cancelled,
}

impl ProviderError {
    /// Whether a Primary failure of this kind falls through to the
    /// Secondary provider. Only cancellation stops the chain.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Overload-class upstream responses that a provider may retry with
    /// backoff. Safety blocks, quota signals and timeouts never are.
    pub fn is_transient_overload(&self) -> bool {
        matches!(
            self,
            Self::UpstreamError {
                status: 500 | 502 | 503 | 504,
                ..
            }
        )
    }

    /// Short machine-readable code for journals and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NetworkFailure(_) => "NETWORK_FAILURE",
            Self::Timeout(_) => "TIMEOUT",
            Self::UpstreamError { .. } => "UPSTREAM_ERROR",
            Self::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            Self::InsufficientResults { .. } => "INSUFFICIENT_RESULTS",
            Self::SafetyBlocked(_) => "SAFETY_BLOCKED",
            Self::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// What the caller of an orchestration sees on failure. Never carries
/// partial alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecommendError {
    #[error("no recommendations available (primary: {primary}; secondary: {secondary})")]
    Exhausted {
        primary: ProviderError,
        secondary: ProviderError,
    },

    #[error("recommendation request cancelled")]
    Cancelled,
}

impl RecommendError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Exhausted { .. } => "RECOMMEND_EXHAUSTED",
            Self::Cancelled => "RECOMMEND_CANCELLED",
        }
    }

    /// Whether the caller should offer a retry affordance.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classes() {
        assert!(ProviderError::NetworkFailure("refused".into()).is_recoverable());
        assert!(ProviderError::Timeout(Duration::from_secs(150)).is_recoverable());
        assert!(ProviderError::UpstreamError {
            status: 502,
            body: String::new()
        }
        .is_recoverable());
        assert!(ProviderError::MalformedPayload("eof".into()).is_recoverable());
        assert!(ProviderError::InsufficientResults {
            found: 1,
            required: 2
        }
        .is_recoverable());
        assert!(ProviderError::SafetyBlocked("SAFETY".into()).is_recoverable());
        assert!(!ProviderError::Cancelled.is_recoverable());
    }

    #[test]
    fn test_transient_overload_is_5xx_only() {
        assert!(ProviderError::UpstreamError {
            status: 503,
            body: "overloaded".into()
        }
        .is_transient_overload());
        assert!(!ProviderError::UpstreamError {
            status: 400,
            body: String::new()
        }
        .is_transient_overload());
        assert!(!ProviderError::QuotaExceeded("429".into()).is_transient_overload());
        assert!(!ProviderError::SafetyBlocked("SAFETY".into()).is_transient_overload());
        assert!(!ProviderError::Timeout(Duration::from_secs(60)).is_transient_overload());
    }

    #[test]
    fn test_exhausted_message_carries_both_causes() {
        let err = RecommendError::Exhausted {
            primary: ProviderError::Timeout(Duration::from_secs(150)),
            secondary: ProviderError::QuotaExceeded("429".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("timed out"));
        assert!(msg.contains("quota exceeded"));
        assert!(err.is_retryable());
    }
}
