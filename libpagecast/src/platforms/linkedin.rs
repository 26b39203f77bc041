//! LinkedIn UGC post publisher
//!
//! A single JSON POST to the UGC Posts API. The text is composed from the
//! record's optional title, the body, and an optional trailing link (LinkedIn
//! unfurls a URL best when it sits on its own line), then truncated well
//! below the platform's ceiling.

use async_trait::async_trait;
use serde_json::{json, Value as Json};

use crate::config::LinkedinConfig;
use crate::error::{PlatformError, Result};
use crate::platforms::Publisher;
use crate::record::PostRecord;

const UGC_POSTS_ENDPOINT: &str = "https://api.linkedin.com/v2/ugcPosts";

/// Safe length under LinkedIn's 3000-character commentary limit
pub const LINKEDIN_MAX_CHARS: usize = 2800;

/// Truncate on a char boundary.
fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

/// Compose the share text from title, body, and link.
pub fn compose_text(record: &PostRecord) -> String {
    let mut text = record.body.trim().to_string();

    if let Some(title) = record.title().map(str::trim).filter(|t| !t.is_empty()) {
        if !text.to_lowercase().starts_with(&title.to_lowercase()) {
            text = format!("{}\n\n{}", title, text);
        }
    }

    if let Some(link) = record.link().map(str::trim).filter(|l| !l.is_empty()) {
        text = format!("{}\n\n{}", text, link);
    }

    truncate_chars(&text, LINKEDIN_MAX_CHARS)
}

fn map_linkedin_error(status: reqwest::StatusCode, body: &str) -> PlatformError {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return PlatformError::Authentication(format!(
            "LinkedIn rejected the access token ({}): {}",
            status, body
        ));
    }
    PlatformError::Posting(format!("LinkedIn publish failed ({}): {}", status, body))
}

pub struct LinkedinPublisher {
    config: LinkedinConfig,
    client: reqwest::Client,
}

impl LinkedinPublisher {
    pub fn new(config: LinkedinConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Publisher for LinkedinPublisher {
    fn name(&self) -> &str {
        "linkedin"
    }

    fn id_field(&self) -> &str {
        "li_post_id"
    }

    fn character_limit(&self) -> Option<usize> {
        Some(LINKEDIN_MAX_CHARS)
    }

    fn validate(&self, record: &PostRecord) -> Result<()> {
        if compose_text(record).is_empty() {
            return Err(PlatformError::Validation(
                "Record has no text to share on LinkedIn".to_string(),
            )
            .into());
        }
        Ok(())
    }

    async fn publish(&self, record: &PostRecord) -> Result<String> {
        self.validate(record)?;
        let text = compose_text(record);

        let payload = json!({
            "author": self.config.author_urn,
            "lifecycleState": "PUBLISHED",
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "shareCommentary": { "text": text },
                    "shareMediaCategory": "NONE",
                },
            },
            "visibility": {
                "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC",
            },
        });

        tracing::debug!("Posting to LinkedIn as {}", self.config.author_urn);

        let response = self
            .client
            .post(UGC_POSTS_ENDPOINT)
            .bearer_auth(&self.config.access_token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&payload)
            .send()
            .await
            .map_err(|e| PlatformError::Network(format!("LinkedIn request failed: {}", e)))?;

        let status = response.status();
        // The created URN also arrives in this header; some responses carry
        // an empty body.
        let header_id = response
            .headers()
            .get("x-restli-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::Network(format!("LinkedIn response read failed: {}", e)))?;

        if !status.is_success() {
            return Err(map_linkedin_error(status, &body).into());
        }

        let body_id = serde_json::from_str::<Json>(&body)
            .ok()
            .and_then(|json| json.get("id").and_then(Json::as_str).map(str::to_string));

        body_id.or(header_id).ok_or_else(|| {
            PlatformError::Posting(format!("LinkedIn response had no post id: {}", body)).into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::FrontMatter;
    use std::path::PathBuf;

    fn record_from(text: &str) -> PostRecord {
        let (front, body) = FrontMatter::parse(text);
        PostRecord {
            path: PathBuf::from("posts/a.md"),
            front,
            body,
        }
    }

    #[test]
    fn test_compose_plain_body() {
        let record = record_from("---\nstatus: ready\n---\nJust the body.");
        assert_eq!(compose_text(&record), "Just the body.");
    }

    #[test]
    fn test_compose_prepends_title() {
        let record =
            record_from("---\nstatus: ready\ntitle: Release notes\n---\nWe shipped v2 today.");
        assert_eq!(
            compose_text(&record),
            "Release notes\n\nWe shipped v2 today."
        );
    }

    #[test]
    fn test_compose_skips_title_already_leading() {
        let record = record_from(
            "---\nstatus: ready\ntitle: Release Notes\n---\nrelease notes for v2 are out.",
        );
        assert_eq!(compose_text(&record), "release notes for v2 are out.");
    }

    #[test]
    fn test_compose_appends_link_on_own_line() {
        let record = record_from(
            "---\nstatus: ready\nlink: https://example.com/v2\n---\nWe shipped v2 today.",
        );
        assert_eq!(
            compose_text(&record),
            "We shipped v2 today.\n\nhttps://example.com/v2"
        );
    }

    #[test]
    fn test_compose_title_body_link() {
        let record = record_from(
            "---\nstatus: ready\ntitle: v2\nlink: https://example.com/v2\n---\nShipped.",
        );
        assert_eq!(compose_text(&record), "v2\n\nShipped.\n\nhttps://example.com/v2");
    }

    #[test]
    fn test_compose_truncates() {
        let long_body = "x".repeat(4000);
        let record = record_from(&format!("---\nstatus: ready\n---\n{}", long_body));
        assert_eq!(compose_text(&record).chars().count(), LINKEDIN_MAX_CHARS);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "é".repeat(10);
        assert_eq!(truncate_chars(&text, 4), "éééé");
    }

    #[test]
    fn test_validate_empty_record() {
        let publisher = LinkedinPublisher::new(LinkedinConfig {
            author_urn: "urn:li:person:TEST".to_string(),
            access_token: "token".to_string(),
        });
        let record = record_from("");
        assert!(matches!(
            publisher.validate(&record),
            Err(crate::PagecastError::Platform(PlatformError::Validation(_)))
        ));
    }

    #[test]
    fn test_publisher_surface() {
        let publisher = LinkedinPublisher::new(LinkedinConfig {
            author_urn: "urn:li:person:TEST".to_string(),
            access_token: "token".to_string(),
        });
        assert_eq!(publisher.name(), "linkedin");
        assert_eq!(publisher.id_field(), "li_post_id");
        assert_eq!(publisher.character_limit(), Some(LINKEDIN_MAX_CHARS));
    }

    #[test]
    fn test_map_linkedin_error_auth() {
        let error = map_linkedin_error(reqwest::StatusCode::UNAUTHORIZED, "expired");
        assert!(matches!(error, PlatformError::Authentication(_)));
    }
}
