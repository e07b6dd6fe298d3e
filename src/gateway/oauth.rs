//! OAuth 1.0a request signing (HMAC-SHA1)
//!
//! Only the OAuth protocol parameters and URL query parameters are signed; JSON
//! request bodies are not part of the signature base string.

use crate::config::OAuthCredentials;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;
use url::Url;

type HmacSha1 = Hmac<Sha1>;

/// Signs requests with user-context credentials
#[derive(Debug, Clone)]
pub struct OAuth1Signer {
    credentials: OAuthCredentials,
}

impl OAuth1Signer {
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self { credentials }
    }

    /// Builds an `Authorization` header with a fresh nonce and timestamp
    pub fn authorization_header(&self, method: &str, url: &Url) -> String {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp();
        self.authorization_header_with(method, url, &[], &nonce, timestamp)
    }

    /// Builds an `Authorization` header from explicit inputs
    ///
    /// `extra_params` are form-body parameters that take part in the signature
    /// (unused for JSON bodies).
    pub fn authorization_header_with(
        &self,
        method: &str,
        url: &Url,
        extra_params: &[(&str, &str)],
        nonce: &str,
        timestamp: i64,
    ) -> String {
        let timestamp = timestamp.to_string();
        let mut oauth_params = vec![
            ("oauth_consumer_key", self.credentials.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.credentials.access_token.as_str()),
            ("oauth_version", "1.0"),
        ];

        let signature = self.signature(method, url, &oauth_params, extra_params);
        oauth_params.push(("oauth_signature", signature.as_str()));

        let fields = oauth_params
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", encode(key), encode(value)))
            .collect::<Vec<_>>()
            .join(", ");

        format!("OAuth {}", fields)
    }

    fn signature(
        &self,
        method: &str,
        url: &Url,
        oauth_params: &[(&str, &str)],
        extra_params: &[(&str, &str)],
    ) -> String {
        let base = signature_base_string(method, url, oauth_params, extra_params);
        let key = format!(
            "{}&{}",
            encode(&self.credentials.consumer_secret),
            encode(&self.credentials.access_token_secret)
        );

        let mut mac =
            HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
        mac.update(base.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// Builds the signature base string: `METHOD&url&params`
pub fn signature_base_string(
    method: &str,
    url: &Url,
    oauth_params: &[(&str, &str)],
    extra_params: &[(&str, &str)],
) -> String {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (encode(&k), encode(&v)))
        .chain(
            oauth_params
                .iter()
                .chain(extra_params)
                .map(|(k, v)| (encode(k), encode(v))),
        )
        .collect();
    params.sort();

    let param_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut base_url = url.clone();
    base_url.set_query(None);
    base_url.set_fragment(None);

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(base_url.as_str()),
        encode(&param_string)
    )
}

/// RFC 3986 percent-encoding (unreserved characters pass through)
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
