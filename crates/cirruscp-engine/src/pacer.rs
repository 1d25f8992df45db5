//! Throughput pacing for remote operations
//!
//! Token-bucket admission shared by every unit on the pool. Property
//! application moves no payload bytes, so each operation spends exactly one
//! admission.

use cirruscp_config::Config;
use cirruscp_types::RateLimit;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::fmt;

/// Operation pacer governing how fast remote calls may be issued
pub struct Pacer {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl Pacer {
    /// Create a pacer admitting at most the given rate
    pub fn new(rate: RateLimit) -> Self {
        Self {
            limiter: Some(RateLimiter::direct(Quota::per_second(rate.as_nonzero()))),
        }
    }

    /// Create a pacer that admits everything immediately
    pub fn unlimited() -> Self {
        Self { limiter: None }
    }

    /// Create a pacer from the main configuration
    pub fn from_config(config: &Config) -> Self {
        if config.pacing.enabled {
            Self::new(config.pacing.operations_per_second)
        } else {
            Self::unlimited()
        }
    }

    /// Wait until the next operation is admitted
    pub async fn admit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    /// Check whether this pacer actually limits throughput
    pub fn is_limited(&self) -> bool {
        self.limiter.is_some()
    }
}

impl fmt::Debug for Pacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pacer")
            .field("limited", &self.is_limited())
            .finish()
    }
}
