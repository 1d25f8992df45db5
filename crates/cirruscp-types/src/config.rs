//! Configuration value types for CirrusCP
//!
//! Small value types and policy structs consumed by the configuration
//! crate and the engine.

use std::num::NonZeroU32;
use std::time::Duration;

/// Concurrency width of the shared execution pool.
///
/// Construction clamps into the usable range instead of failing, so every
/// configuration source yields a width the pool can actually run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "usize", into = "usize")
)]
pub struct WorkerCount(usize);

impl WorkerCount {
    /// Upper bound on pool width
    pub const CEILING: usize = 256;

    /// Create a worker count, clamping into `1..=CEILING`
    pub fn clamped(count: usize) -> Self {
        Self(count.clamp(1, Self::CEILING))
    }

    /// Get the worker count value
    pub fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for WorkerCount {
    fn from(count: usize) -> Self {
        Self::clamped(count)
    }
}

impl From<WorkerCount> for usize {
    fn from(count: WorkerCount) -> usize {
        count.0
    }
}

impl Default for WorkerCount {
    /// One worker per available core
    fn default() -> Self {
        Self::clamped(std::thread::available_parallelism().map_or(4, |n| n.get()))
    }
}

/// Remote-operation budget in operations per second.
///
/// Clamped into `1..=CEILING` on construction; the pacer reads it as a
/// non-zero quota. Disabling pacing altogether is a separate switch, not a
/// zero rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "u32", into = "u32")
)]
pub struct RateLimit(u32);

impl RateLimit {
    /// Upper bound on the rate
    pub const CEILING: u32 = 1_000_000;
    /// Default rate
    pub const DEFAULT: u32 = 1_000;

    /// Create a rate limit, clamping into `1..=CEILING`
    pub fn clamped(ops_per_second: u32) -> Self {
        Self(ops_per_second.clamp(1, Self::CEILING))
    }

    /// Get the rate in operations per second
    pub fn get(self) -> u32 {
        self.0
    }

    /// Get the rate as the non-zero quota the pacer consumes
    pub fn as_nonzero(self) -> NonZeroU32 {
        NonZeroU32::new(self.0).unwrap_or(NonZeroU32::MIN)
    }
}

impl From<u32> for RateLimit {
    fn from(ops_per_second: u32) -> Self {
        Self::clamped(ops_per_second)
    }
}

impl From<RateLimit> for u32 {
    fn from(rate: RateLimit) -> u32 {
        rate.0
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Retry budget applied by remote client implementations.
///
/// The engine itself issues single best-effort calls; this policy belongs
/// to the client layer that owns transient-error handling.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct RetryConfig {
    /// Maximum number of retries
    pub max_retries: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Create a new retry configuration with validation
    pub fn new(
        max_retries: u32,
        initial_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
    ) -> Result<Self, String> {
        if backoff_multiplier <= 1.0 {
            return Err("Backoff multiplier must be greater than 1.0".to_string());
        }
        if initial_delay > max_delay {
            return Err("Initial delay cannot be greater than max delay".to_string());
        }
        Ok(Self {
            max_retries,
            initial_delay,
            max_delay,
            backoff_multiplier,
        })
    }

    /// Calculate the delay for a given retry attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return self.initial_delay;
        }

        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let delay_ms = delay_ms.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(delay_ms as u64)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

/// Timeout configuration for remote operations
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct TimeoutConfig {
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Per-call timeout
    pub call_timeout: Duration,
    /// Overall operation timeout
    pub operation_timeout: Option<Duration>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            call_timeout: Duration::from_secs(60),
            operation_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(8, 8)]
    #[case(256, 256)]
    #[case(4096, WorkerCount::CEILING)]
    fn test_worker_count_clamping(#[case] requested: usize, #[case] effective: usize) {
        assert_eq!(WorkerCount::clamped(requested).get(), effective);
        assert_eq!(WorkerCount::from(requested).get(), effective);
    }

    #[test]
    fn test_default_worker_count_in_range() {
        let count = WorkerCount::default().get();
        assert!((1..=WorkerCount::CEILING).contains(&count));
    }

    #[rstest]
    #[case(0, 1)]
    #[case(250, 250)]
    #[case(u32::MAX, RateLimit::CEILING)]
    fn test_rate_limit_clamping(#[case] requested: u32, #[case] effective: u32) {
        assert_eq!(RateLimit::clamped(requested).get(), effective);
    }

    #[test]
    fn test_rate_limit_quota_is_never_zero() {
        assert_eq!(RateLimit::clamped(0).as_nonzero().get(), 1);
        assert_eq!(RateLimit::default().as_nonzero().get(), RateLimit::DEFAULT);
    }

    #[test]
    fn test_retry_delay_backoff() {
        let retry = RetryConfig::default();

        assert_eq!(retry.delay_for_attempt(0), retry.initial_delay);
        assert!(retry.delay_for_attempt(2) > retry.delay_for_attempt(1));
        // Capped by the maximum delay.
        assert!(retry.delay_for_attempt(30) <= retry.max_delay);
    }

    #[test]
    fn test_retry_validation() {
        assert!(RetryConfig::new(
            3,
            Duration::from_millis(100),
            Duration::from_secs(1),
            1.0
        )
        .is_err());
        assert!(RetryConfig::new(
            3,
            Duration::from_secs(2),
            Duration::from_secs(1),
            2.0
        )
        .is_err());
    }
}
