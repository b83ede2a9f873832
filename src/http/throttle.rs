//! Client-side request budget
//!
//! A token bucket (governor) shared by every request a client makes, so a
//! long browse stays under the catalog API's quota.

use governor::{DefaultDirectRateLimiter, Quota};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Requests allowed per second and how many may go out back to back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    #[serde(default = "default_per_second")]
    pub per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            per_second: default_per_second(),
            burst: default_burst(),
        }
    }
}

fn default_per_second() -> u32 {
    5
}

fn default_burst() -> u32 {
    5
}

/// Token bucket gate in front of the transport
pub struct Throttle {
    limiter: DefaultDirectRateLimiter,
}

impl Throttle {
    /// Zero in either setting is treated as one
    pub fn new(limit: RateLimit) -> Self {
        let per_second = NonZeroU32::new(limit.per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(limit.burst).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(per_second).allow_burst(burst);
        Self {
            limiter: DefaultDirectRateLimiter::direct(quota),
        }
    }

    /// Wait for a token
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod throttle_tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_burst_passes_then_waits() {
        let throttle = Throttle::new(RateLimit {
            per_second: 10,
            burst: 3,
        });

        let started = Instant::now();
        for _ in 0..3 {
            throttle.acquire().await;
        }
        assert!(started.elapsed() < Duration::from_millis(50));

        throttle.acquire().await;
        assert!(started.elapsed() >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn test_zero_limit_still_admits() {
        let throttle = Throttle::new(RateLimit {
            per_second: 0,
            burst: 0,
        });
        throttle.acquire().await;
    }

    #[test]
    fn test_rate_limit_yaml_defaults() {
        let limit: RateLimit = serde_yaml::from_str("burst: 2\n").unwrap();
        assert_eq!(limit.per_second, 5);
        assert_eq!(limit.burst, 2);
    }
}
