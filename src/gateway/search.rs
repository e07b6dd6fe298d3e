//! Recent-post search gateway
//!
//! # Response handling
//!
//! | Condition | Outcome |
//! |-----------|---------|
//! | No bearer token | `Error(ConfigurationMissing)` |
//! | HTTP 200 with posts | `Items` |
//! | HTTP 200 without `data` | `Empty` |
//! | HTTP 429 with reset metadata | `RateLimited` |
//! | HTTP 429 without reset metadata | `Error(MissingResetMetadata)` |
//! | Other non-2xx | `Error(UpstreamRejected)` |
//! | Timeout / connection failure | `Error(Transport)` |

use crate::gateway::{api_user_agent, build_http_client, FetchOutcome, GatewayError, ItemSource};
use crate::gateway::rate_limit::RateLimitState;
use crate::queue::FetchedItem;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchPost>,
}

#[derive(Debug, Deserialize)]
struct SearchPost {
    id: String,
    #[serde(default)]
    text: String,
}

/// Fetch gateway backed by the recent-search endpoint
pub struct SearchGateway {
    client: Client,
    url: String,
    bearer_token: Option<String>,
}

impl SearchGateway {
    /// Creates a search gateway
    ///
    /// # Arguments
    ///
    /// * `url` - Recent-search endpoint
    /// * `bearer_token` - App-only token; without it every fetch fails fast
    /// * `timeout` - Per-request timeout
    pub fn new(
        url: impl Into<String>,
        bearer_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(&api_user_agent(), timeout)?,
            url: url.into(),
            bearer_token,
        })
    }
}

#[async_trait]
impl ItemSource for SearchGateway {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn fetch(&self, query: &str, max_results: u32) -> FetchOutcome {
        let Some(token) = self.bearer_token.as_deref() else {
            return FetchOutcome::Error(GatewayError::ConfigurationMissing("TWITTER_BEARER_TOKEN"));
        };

        let max_results = max_results.to_string();
        let response = match self
            .client
            .get(&self.url)
            .bearer_auth(token)
            .query(&[
                ("query", query),
                ("max_results", max_results.as_str()),
                ("tweet.fields", "created_at,author_id,public_metrics,text"),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Error(GatewayError::from_reqwest(&e)),
        };

        let status = response.status();
        let rate_limit = RateLimitState::from_headers(response.headers(), Utc::now());
        if let Some(remaining) = rate_limit.remaining {
            tracing::debug!(
                "Search rate limit: {} remaining, resets at {:?}",
                remaining,
                rate_limit.reset_at
            );
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return match rate_limit.reset_at {
                Some(reset_at) => {
                    tracing::warn!("Search rate limited until {}", reset_at);
                    FetchOutcome::RateLimited { reset_at }
                }
                None => FetchOutcome::Error(GatewayError::MissingResetMetadata {
                    status: status.as_u16(),
                }),
            };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return FetchOutcome::Error(GatewayError::from_reqwest(&e)),
        };

        if !status.is_success() {
            return FetchOutcome::Error(GatewayError::rejected(status.as_u16(), &body));
        }

        let parsed: SearchResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => return FetchOutcome::Error(GatewayError::Decode(e.to_string())),
        };

        let items: Vec<FetchedItem> = parsed
            .data
            .into_iter()
            .filter(|post| !post.id.is_empty())
            .map(|post| FetchedItem::post(post.id, post.text))
            .collect();

        tracing::info!("Search for '{}' returned {} posts", query, items.len());

        if items.is_empty() {
            FetchOutcome::Empty
        } else {
            FetchOutcome::Items(items)
        }
    }
}
