//! Rate-limit metadata parsing
//!
//! The platform reports its per-endpoint window in response headers:
//!
//! | Header | Meaning |
//! |--------|---------|
//! | `x-rate-limit-limit` | Requests allowed per window |
//! | `x-rate-limit-remaining` | Requests left in the current window |
//! | `x-rate-limit-reset` | Window reset, epoch seconds |
//! | `Retry-After` | Seconds to wait (used when the reset header is absent) |
//!
//! A `RateLimitState` is derived per response and never stored; fetch and publish
//! each read their own.

use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};

pub const LIMIT_HEADER: &str = "x-rate-limit-limit";
pub const REMAINING_HEADER: &str = "x-rate-limit-remaining";
pub const RESET_HEADER: &str = "x-rate-limit-reset";

/// Rate-limit window reported by one response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateLimitState {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitState {
    /// Reads rate-limit headers
    ///
    /// `now` anchors a relative `Retry-After` value when no absolute reset is given.
    pub fn from_headers(headers: &HeaderMap, now: DateTime<Utc>) -> Self {
        let reset_at = header_number::<i64>(headers, RESET_HEADER)
            .and_then(|epoch| Utc.timestamp_opt(epoch, 0).single())
            .or_else(|| {
                header_number::<i64>(headers, RETRY_AFTER.as_str())
                    .filter(|secs| *secs >= 0)
                    .map(|secs| now + chrono::Duration::seconds(secs))
            });

        Self {
            limit: header_number(headers, LIMIT_HEADER),
            remaining: header_number(headers, REMAINING_HEADER),
            reset_at,
        }
    }

    /// Whether the window has no requests left
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Whether any rate-limit metadata was present
    pub fn is_known(&self) -> bool {
        self.limit.is_some() || self.remaining.is_some() || self.reset_at.is_some()
    }

    /// Seconds until the window resets, clamped at zero
    pub fn seconds_until_reset(&self, now: DateTime<Utc>) -> Option<i64> {
        self.reset_at.map(|reset| (reset - now).num_seconds().max(0))
    }
}

fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}
