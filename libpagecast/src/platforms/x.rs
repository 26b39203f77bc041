//! X (Twitter) publisher
//!
//! The v2 tweet endpoint takes a JSON body but still authenticates with
//! OAuth 1.0a: every request carries an Authorization header holding a
//! timestamp, a nonce, and an HMAC-SHA1 signature over the canonical
//! parameter string. The JSON body is not part of the signature; only the
//! oauth_* parameters are.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::Rng;
use serde_json::{json, Value as Json};
use sha1::Sha1;

use crate::config::XConfig;
use crate::error::{PlatformError, Result};
use crate::platforms::Publisher;
use crate::record::PostRecord;

const TWEETS_ENDPOINT: &str = "https://api.x.com/2/tweets";

/// Safe length under X's 280-character hard limit
pub const X_MAX_CHARS: usize = 270;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay bare; everything else is encoded.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn oauth_encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

/// Build the signature base string: method, URL, and the sorted
/// percent-encoded parameter string, each encoded and joined with `&`.
fn signature_base_string(method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (oauth_encode(k), oauth_encode(v)))
        .collect();
    pairs.sort();
    let param_string = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method,
        oauth_encode(url),
        oauth_encode(&param_string)
    )
}

fn hmac_sha1(base: &str, consumer_secret: &str, token_secret: &str) -> Result<String> {
    let key = format!(
        "{}&{}",
        oauth_encode(consumer_secret),
        oauth_encode(token_secret)
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).map_err(|e| {
        PlatformError::Authentication(format!("Failed to build signing key: {}", e))
    })?;
    mac.update(base.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

fn nonce() -> String {
    let mut rng = rand::thread_rng();
    (0..16).map(|_| format!("{:02x}", rng.gen::<u8>())).collect()
}

/// Compute the OAuth 1.0a Authorization header for one request.
///
/// Split out from the publisher (and parameterized over nonce and timestamp)
/// so the signing pipeline is deterministic under test.
pub(crate) fn authorization_header(
    config: &XConfig,
    method: &str,
    url: &str,
    nonce: &str,
    timestamp: i64,
) -> Result<String> {
    let timestamp = timestamp.to_string();
    let params: Vec<(String, String)> = vec![
        ("oauth_consumer_key".to_string(), config.api_key.clone()),
        ("oauth_nonce".to_string(), nonce.to_string()),
        ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
        ("oauth_timestamp".to_string(), timestamp.clone()),
        ("oauth_token".to_string(), config.access_token.clone()),
        ("oauth_version".to_string(), "1.0".to_string()),
    ];

    let base = signature_base_string(method, url, &params);
    let signature = hmac_sha1(&base, &config.api_secret, &config.access_token_secret)?;

    let mut header_params: Vec<(String, String)> = params;
    header_params.push(("oauth_signature".to_string(), signature));
    header_params.sort();

    let fields = header_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, oauth_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("OAuth {}", fields))
}

fn map_x_error(status: reqwest::StatusCode, body: &str) -> PlatformError {
    if status == reqwest::StatusCode::FORBIDDEN && body.to_lowercase().contains("duplicate") {
        // X rejects a byte-identical tweet; the record was most likely
        // published by an earlier run that failed before recording.
        return PlatformError::Duplicate(format!("X refused a duplicate tweet: {}", body));
    }
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return PlatformError::Authentication(format!(
            "X rejected the request signature ({}): {}",
            status, body
        ));
    }
    PlatformError::Posting(format!("X publish failed ({}): {}", status, body))
}

pub struct XPublisher {
    config: XConfig,
    client: reqwest::Client,
}

impl XPublisher {
    pub fn new(config: XConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Publisher for XPublisher {
    fn name(&self) -> &str {
        "x"
    }

    fn id_field(&self) -> &str {
        "x_post_id"
    }

    fn character_limit(&self) -> Option<usize> {
        Some(X_MAX_CHARS)
    }

    fn validate(&self, record: &PostRecord) -> Result<()> {
        if record.body.trim().is_empty() {
            return Err(
                PlatformError::Validation("Record has no text to tweet".to_string()).into(),
            );
        }
        Ok(())
    }

    async fn publish(&self, record: &PostRecord) -> Result<String> {
        self.validate(record)?;
        let text = truncate_chars(record.body.trim(), X_MAX_CHARS);

        let header = authorization_header(
            &self.config,
            "POST",
            TWEETS_ENDPOINT,
            &nonce(),
            chrono::Utc::now().timestamp(),
        )?;

        tracing::debug!("Posting {} characters to X", text.chars().count());

        let response = self
            .client
            .post(TWEETS_ENDPOINT)
            .header("Authorization", header)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| PlatformError::Network(format!("X request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::Network(format!("X response read failed: {}", e)))?;

        if !status.is_success() {
            return Err(map_x_error(status, &body).into());
        }

        let json: Json = serde_json::from_str(&body)
            .map_err(|e| PlatformError::Posting(format!("X returned unparsable JSON: {}", e)))?;
        let post_id = json
            .pointer("/data/id")
            .and_then(Json::as_str)
            .ok_or_else(|| {
                PlatformError::Posting(format!("X response had no tweet id: {}", body))
            })?
            .to_string();

        tracing::debug!("Posted to X: {}", post_id);
        Ok(post_id)
    }
}
