//! Post creation gateway
//!
//! # Response handling
//!
//! | Condition | Outcome |
//! |-----------|---------|
//! | No OAuth credentials | `Unconfigured` (text is logged instead) |
//! | HTTP 200/201 | `Success` with the new post id when present |
//! | HTTP 429 with reset metadata | `RateLimited` |
//! | HTTP 429 without reset metadata | `Error(MissingResetMetadata)` |
//! | Other non-2xx | `Error(UpstreamRejected)` |
//! | Timeout / connection failure | `Error(Transport)` |

use crate::config::OAuthCredentials;
use crate::gateway::oauth::OAuth1Signer;
use crate::gateway::rate_limit::RateLimitState;
use crate::gateway::{api_user_agent, build_http_client, GatewayError, PublishOutcome, Publisher};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Serialize)]
struct CreatePostRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<ReplySettings<'a>>,
}

#[derive(Debug, Serialize)]
struct ReplySettings<'a> {
    in_reply_to_tweet_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatePostResponse {
    data: Option<CreatedPost>,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    id: String,
}

/// Publish gateway backed by the post creation endpoint
pub struct PublishGateway {
    client: Client,
    url: Url,
    signer: Option<OAuth1Signer>,
}

impl PublishGateway {
    /// Creates a publish gateway
    ///
    /// # Arguments
    ///
    /// * `url` - Post creation endpoint
    /// * `credentials` - User-context credentials; `None` makes every publish `Unconfigured`
    /// * `timeout` - Per-request timeout
    pub fn new(
        url: Url,
        credentials: Option<OAuthCredentials>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(&api_user_agent(), timeout)?,
            url,
            signer: credentials.map(OAuth1Signer::new),
        })
    }

    /// Whether publishing credentials were supplied
    pub fn is_configured(&self) -> bool {
        self.signer.is_some()
    }
}

#[async_trait]
impl Publisher for PublishGateway {
    fn name(&self) -> &'static str {
        "platform"
    }

    async fn publish(&self, reply_to: Option<&str>, text: &str) -> PublishOutcome {
        let Some(signer) = &self.signer else {
            tracing::warn!(
                "Publishing credentials missing; generated text not posted: {}",
                text
            );
            return PublishOutcome::Unconfigured;
        };

        let body = CreatePostRequest {
            text,
            reply: reply_to.map(|id| ReplySettings {
                in_reply_to_tweet_id: id,
            }),
        };

        let response = match self
            .client
            .post(self.url.clone())
            .header(AUTHORIZATION, signer.authorization_header("POST", &self.url))
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return PublishOutcome::Error(GatewayError::from_reqwest(&e)),
        };

        let status = response.status();
        let rate_limit = RateLimitState::from_headers(response.headers(), Utc::now());

        if status == StatusCode::TOO_MANY_REQUESTS {
            return match rate_limit.reset_at {
                Some(reset_at) => {
                    tracing::warn!("Publishing rate limited until {}", reset_at);
                    PublishOutcome::RateLimited { reset_at }
                }
                None => PublishOutcome::Error(GatewayError::MissingResetMetadata {
                    status: status.as_u16(),
                }),
            };
        }

        let raw = match response.text().await {
            Ok(raw) => raw,
            Err(e) if status.is_success() => {
                // The post exists; only the confirmation body was lost
                tracing::warn!("Published but failed to read response: {}", e);
                return PublishOutcome::Success { new_id: None };
            }
            Err(e) => return PublishOutcome::Error(GatewayError::from_reqwest(&e)),
        };

        if !status.is_success() {
            return PublishOutcome::Error(GatewayError::rejected(status.as_u16(), &raw));
        }

        let new_id = match serde_json::from_str::<CreatePostResponse>(&raw) {
            Ok(parsed) => parsed.data.map(|post| post.id),
            Err(e) => {
                tracing::warn!("Published but response was not understood: {}", e);
                None
            }
        };

        match (&new_id, reply_to) {
            (Some(id), Some(target)) => tracing::info!("Replied to {} with post {}", target, id),
            (Some(id), None) => tracing::info!("Published post {}", id),
            (None, _) => tracing::info!("Published post (id unknown)"),
        }

        PublishOutcome::Success { new_id }
    }
}
