//! Scheduler loop
//!
//! The agent runs one tick at a time on a single task:
//!
//! 1. If the queue holds work, publish the front item.
//! 2. Otherwise fetch, filter, enqueue the accepted items and publish the first.
//! 3. Sleep according to the `BackoffPolicy`, or stop on shutdown.
//!
//! A failed publish puts the item back at the front of the queue, so fetch and
//! publish rate limits are waited out independently.

mod agent;
mod backoff;
mod stats;

pub use agent::{Agent, AgentSettings, TickOutcome, TickReport};
pub use backoff::BackoffPolicy;
pub use stats::SessionStats;
