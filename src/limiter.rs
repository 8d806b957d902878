//! Request throttling for the reservation entry point.
//!
//! The counter lives in the store (one fixed window per source and
//! endpoint) so every instance of the service sees the same counts.
//! Failure policy: if the counter store cannot answer, the request is
//! allowed and the degradation is logged at `warn`.

use rusqlite::Connection;

use crate::db;

/// Endpoint name used by the reservation flow.
pub const RESERVE_ENDPOINT: &str = "reserve";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window_secs: i64,
}

impl RateLimitPolicy {
    /// Booking default: 5 requests per 15 minutes per source.
    pub const fn reserve_default() -> Self {
        Self {
            max_requests: 5,
            window_secs: 15 * 60,
        }
    }
}

/// Store-backed fixed-window limiter.
pub struct RateLimiter {
    policy: RateLimitPolicy,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Record one request and apply the policy. Returns `Ok(())` to
    /// allow, or `Err(retry_after_secs)` when the source has exhausted
    /// its window.
    ///
    /// Fails open: a store error allows the request and logs a
    /// degraded-mode warning.
    pub fn check(
        &self,
        conn: &Connection,
        source_id: &str,
        endpoint: &str,
        now_epoch: i64,
    ) -> Result<(), u64> {
        match db::bump_rate_limit(conn, source_id, endpoint, now_epoch, self.policy.window_secs)
        {
            Ok(state) => {
                if state.count > self.policy.max_requests {
                    let elapsed = now_epoch - state.window_start;
                    let retry_after = (self.policy.window_secs - elapsed).max(0) as u64;
                    Err(retry_after)
                } else {
                    Ok(())
                }
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    source_id,
                    endpoint,
                    "rate-limit store unavailable — failing open"
                );
                Ok(())
            }
        }
    }
}
