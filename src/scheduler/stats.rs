use std::fmt;

/// Counters for the current process lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub ticks: u64,

    /// Items returned by fetches
    pub fetched: u64,

    /// Items dropped by the sensitive lexicon
    pub blocked: u64,

    /// Items enqueued
    pub accepted: u64,

    /// Accepted items rejected by the queue as already seen
    pub duplicates: u64,

    pub published: u64,

    /// Publish attempts that ended rate limited, failed or unconfigured
    pub publish_failures: u64,

    /// Posts that used fallback text
    pub fallbacks: u64,

    /// Ticks that panicked
    pub panics: u64,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ticks={} fetched={} blocked={} accepted={} duplicates={} published={} \
             publish_failures={} fallbacks={} panics={}",
            self.ticks,
            self.fetched,
            self.blocked,
            self.accepted,
            self.duplicates,
            self.published,
            self.publish_failures,
            self.fallbacks,
            self.panics
        )
    }
}
