//! Local call-rate guard for the AI-only provider.
//!
//! Keeps us under the upstream per-minute quota before a request is sent,
//! so a burst of fallbacks does not burn through the credential pool.

use governor::{Quota, RateLimiter as GovLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectLimiter = GovLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Per-minute call limiter shared by every clone.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    limiter: Arc<DirectLimiter>,
}

impl RateLimiter {
    /// Create with a per-minute limit. Zero is treated as one.
    pub fn per_minute(calls: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(calls).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: Arc::new(GovLimiter::direct(quota)),
        }
    }

    /// Wait until a call slot is available.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}
