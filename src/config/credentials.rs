//! API credentials read from the process environment
//!
//! Credentials never live in the TOML file. They are read once at startup and
//! handed to the gateway constructors.

use std::fmt;

pub const BEARER_TOKEN_VAR: &str = "TWITTER_BEARER_TOKEN";
pub const API_KEY_VAR: &str = "TWITTER_API_KEY";
pub const API_SECRET_VAR: &str = "TWITTER_API_SECRET";
pub const ACCESS_TOKEN_VAR: &str = "TWITTER_ACCESS_TOKEN";
pub const ACCESS_TOKEN_SECRET_VAR: &str = "TWITTER_ACCESS_TOKEN_SECRET";
pub const GENERATOR_KEY_VAR: &str = "GROQ_API_KEY";

/// OAuth 1.0a user-context credentials used for publishing
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("consumer_key", &"<redacted>")
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

/// All credentials the agent may use; any of them can be absent
#[derive(Clone, Default)]
pub struct Credentials {
    /// App-only bearer token for search
    pub bearer_token: Option<String>,

    /// Signing credentials for publishing
    pub oauth: Option<OAuthCredentials>,

    /// Key for the text generation service
    pub generator_api_key: Option<String>,
}

impl Credentials {
    /// Reads credentials from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads credentials through an arbitrary lookup function
    ///
    /// Empty values are treated as absent. The bearer token is percent-decoded
    /// because it is often pasted in its URL-encoded form (`%2F`, `%3D`).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bearer_token = get(BEARER_TOKEN_VAR).map(|raw| match urlencoding::decode(&raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw,
        });

        let oauth = match (
            get(API_KEY_VAR),
            get(API_SECRET_VAR),
            get(ACCESS_TOKEN_VAR),
            get(ACCESS_TOKEN_SECRET_VAR),
        ) {
            (Some(consumer_key), Some(consumer_secret), Some(access_token), Some(access_token_secret)) => {
                Some(OAuthCredentials {
                    consumer_key,
                    consumer_secret,
                    access_token,
                    access_token_secret,
                })
            }
            _ => None,
        };

        Self {
            bearer_token,
            oauth,
            generator_api_key: get(GENERATOR_KEY_VAR),
        }
    }

    /// Names of the credential groups that are missing, for startup diagnostics
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.bearer_token.is_none() {
            missing.push(BEARER_TOKEN_VAR);
        }
        if self.oauth.is_none() {
            missing.push("TWITTER_API_KEY/SECRET + TWITTER_ACCESS_TOKEN/SECRET");
        }
        if self.generator_api_key.is_none() {
            missing.push(GENERATOR_KEY_VAR);
        }
        missing
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("oauth", &self.oauth)
            .field(
                "generator_api_key",
                &self.generator_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
