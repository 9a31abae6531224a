//! Per-provider request pacing built on governor.
//!
//! Every outbound provider call takes a permit first. When the quota is
//! exhausted the caller waits for the next permit; requests are never dropped
//! and never retried here.

use crate::radar::data_sources::Provider;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, instrument};

/// Direct rate limiter per data provider.
pub struct ProviderRateLimiter {
    limiters: HashMap<Provider, DefaultDirectRateLimiter>,
    requests_per_second: u32,
    /// Requests that had to wait for a permit
    throttled: AtomicU64,
}

impl ProviderRateLimiter {
    /// Create a limiter allowing `requests_per_second` calls to each provider.
    /// A zero quota is raised to one request per second.
    pub fn new(requests_per_second: u32) -> Self {
        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let limiters = Provider::all()
            .into_iter()
            .map(|provider| (provider, RateLimiter::direct(Quota::per_second(per_second))))
            .collect();

        Self {
            limiters,
            requests_per_second: per_second.get(),
            throttled: AtomicU64::new(0),
        }
    }

    /// Wait until a request to `provider` is allowed and consume the permit.
    #[instrument(skip(self))]
    pub async fn acquire(&self, provider: Provider) {
        let Some(limiter) = self.limiters.get(&provider) else {
            return;
        };

        if limiter.check().is_err() {
            self.throttled.fetch_add(1, Ordering::Relaxed);
            debug!("Rate limit reached for {}, waiting for a permit", provider);
            limiter.until_ready().await;
        }
    }

    /// Number of requests that had to wait.
    pub fn throttled_requests(&self) -> u64 {
        self.throttled.load(Ordering::Relaxed)
    }

    pub fn requests_per_second(&self) -> u32 {
        self.requests_per_second
    }
}
