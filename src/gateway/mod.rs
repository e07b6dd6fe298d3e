//! Remote gateways
//!
//! Each gateway wraps one remote operation and translates its raw response into a
//! typed outcome. No transport error crosses into the scheduler, and no gateway
//! ever sleeps to wait out a rate limit; it reports the reset time and returns.
//!
//! - `SearchGateway`: recent-post search on the platform API
//! - `TrendGateway`: scraped trend listings
//! - `PublishGateway`: OAuth 1.0a signed post/reply creation

mod oauth;
mod publish;
mod rate_limit;
mod search;
mod trends;

pub use oauth::OAuth1Signer;
pub use publish::PublishGateway;
pub use rate_limit::RateLimitState;
pub use search::SearchGateway;
pub use trends::{parse_trends24, parse_twitter_trending, rank_trends, TrendGateway};

use crate::queue::FetchedItem;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Longest response body excerpt kept in error details
const MAX_ERROR_BODY: usize = 500;

/// Failures reported by gateways
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Missing credential: {0}")]
    ConfigurationMissing(&'static str),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Upstream rejected request with HTTP {status}: {body}")]
    UpstreamRejected { status: u16, body: String },

    #[error("Rate limited (HTTP {status}) without reset metadata")]
    MissingResetMetadata { status: u16 },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Classifies a reqwest failure
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Transport("Request timeout".to_string())
        } else if error.is_connect() {
            Self::Transport(format!("Connection failed: {}", error))
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }

    /// Builds an upstream rejection, trimming long bodies
    pub fn rejected(status: u16, body: &str) -> Self {
        let body = match body.char_indices().nth(MAX_ERROR_BODY) {
            Some((idx, _)) => format!("{}...", &body[..idx]),
            None => body.to_string(),
        };
        Self::UpstreamRejected { status, body }
    }
}

/// Outcome of a fetch call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// At least one item was returned
    Items(Vec<FetchedItem>),

    /// The fetch endpoint is exhausted until `reset_at`
    RateLimited { reset_at: DateTime<Utc> },

    /// The call failed
    Error(GatewayError),

    /// The call succeeded but returned nothing
    Empty,
}

/// Outcome of a publish call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The post was created; the new id is kept for observability only
    Success { new_id: Option<String> },

    /// The publish endpoint is exhausted until `reset_at`
    RateLimited { reset_at: DateTime<Utc> },

    /// The call failed
    Error(GatewayError),

    /// Publishing credentials are absent; not retryable
    Unconfigured,
}

/// Source of candidate items
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Fetches up to `max_results` items matching `query`
    async fn fetch(&self, query: &str, max_results: u32) -> FetchOutcome;
}

/// Destination for generated text
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Publishes `text`, as a reply to `reply_to` when given
    async fn publish(&self, reply_to: Option<&str>, text: &str) -> PublishOutcome;
}

/// Builds an HTTP client with a per-gateway timeout
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header value
/// * `timeout` - Total request timeout; a call never runs longer than this
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// User agent for API calls
pub fn api_user_agent() -> String {
    format!("kibitz/{}", env!("CARGO_PKG_VERSION"))
}
