//! Facebook page feed publisher
//!
//! A single form-encoded POST against the Graph API feed edge. The only
//! platform quirk is the anti-blank-post guard: template glitches in the
//! upstream generator have produced bodies that are nothing but zero-width
//! characters, so length is checked after stripping those.

use async_trait::async_trait;
use serde_json::Value as Json;

use crate::config::FacebookConfig;
use crate::error::{PlatformError, Result};
use crate::platforms::{Publisher, GRAPH_API_BASE};
use crate::record::PostRecord;

/// Minimum visible body length accepted for a page post
pub const FB_MIN_BODY_CHARS: usize = 10;

/// Strip zero-width characters so the length check sees what a reader sees.
fn strip_zero_width(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}'))
        .collect()
}

fn map_graph_error(status: reqwest::StatusCode, body: &str) -> PlatformError {
    if status == reqwest::StatusCode::UNAUTHORIZED
        || status == reqwest::StatusCode::FORBIDDEN
        || body.contains("OAuthException")
    {
        return PlatformError::Authentication(format!(
            "Facebook rejected the access token ({}): {}",
            status, body
        ));
    }
    PlatformError::Posting(format!("Facebook publish failed ({}): {}", status, body))
}

pub struct FacebookPublisher {
    config: FacebookConfig,
    client: reqwest::Client,
}

impl FacebookPublisher {
    pub fn new(config: FacebookConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Publisher for FacebookPublisher {
    fn name(&self) -> &str {
        "facebook"
    }

    fn id_field(&self) -> &str {
        "fb_post_id"
    }

    fn character_limit(&self) -> Option<usize> {
        None
    }

    fn validate(&self, record: &PostRecord) -> Result<()> {
        let visible = strip_zero_width(record.body.trim());
        if visible.chars().count() < FB_MIN_BODY_CHARS {
            return Err(PlatformError::Validation(format!(
                "Body too short for a Facebook post: {} visible character(s), need at least {}",
                visible.chars().count(),
                FB_MIN_BODY_CHARS
            ))
            .into());
        }
        Ok(())
    }

    async fn publish(&self, record: &PostRecord) -> Result<String> {
        self.validate(record)?;

        let url = format!("{}/{}/feed", GRAPH_API_BASE, self.config.page_id);
        tracing::debug!("Posting to Facebook page {}", self.config.page_id);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("message", record.body.trim()),
                ("access_token", self.config.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PlatformError::Network(format!("Facebook request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::Network(format!("Facebook response read failed: {}", e)))?;

        if !status.is_success() {
            return Err(map_graph_error(status, &body).into());
        }

        let json: Json = serde_json::from_str(&body).map_err(|e| {
            PlatformError::Posting(format!("Facebook returned unparsable JSON: {}", e))
        })?;
        let post_id = json
            .get("id")
            .and_then(Json::as_str)
            .ok_or_else(|| {
                PlatformError::Posting(format!("Facebook response had no post id: {}", body))
            })?
            .to_string();

        tracing::debug!("Posted to Facebook: {}", post_id);
        Ok(post_id)
    }
}
