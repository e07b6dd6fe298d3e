//! Sleep policy between ticks
//!
//! | Tick result | Queue after tick | Wait |
//! |-------------|------------------|------|
//! | Published | any | tick interval |
//! | Unsuccessful | non-empty | short backoff |
//! | Unsuccessful | empty | long backoff |
//! | Panicked | any | recovery backoff |
//!
//! Every wait except the short backoff may be extended by a random jitter of up
//! to `jitter`. The short backoff stays exact so it is always strictly shorter
//! than the long one.

use crate::config::AgentConfig;
use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub tick_interval: Duration,
    pub short: Duration,
    pub long: Duration,
    pub recovery: Duration,
    pub jitter: Duration,
}

impl BackoffPolicy {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            tick_interval: Duration::from_secs(config.tick_interval_secs),
            short: Duration::from_secs(config.short_backoff_secs),
            long: Duration::from_secs(config.long_backoff_secs),
            recovery: Duration::from_secs(config.recovery_backoff_secs),
            jitter: Duration::from_secs(config.jitter_secs),
        }
    }

    /// Base wait after a completed tick, before jitter
    pub fn after_tick(&self, published: bool, queue_empty: bool) -> Duration {
        if published {
            self.tick_interval
        } else if queue_empty {
            self.long
        } else {
            self.short
        }
    }

    /// Wait after a completed tick, with jitter applied where allowed
    pub fn wait_after_tick(&self, published: bool, queue_empty: bool) -> Duration {
        let base = self.after_tick(published, queue_empty);
        if !published && !queue_empty {
            base
        } else {
            self.jittered(base)
        }
    }

    /// Adds a uniform random delay in `0..=jitter`
    pub fn jittered(&self, base: Duration) -> Duration {
        if self.jitter.is_zero() {
            return base;
        }
        let extra_ms = rand::thread_rng().gen_range(0..=self.jitter.as_millis() as u64);
        base + Duration::from_millis(extra_ms)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default())
    }
}
