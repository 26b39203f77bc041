//! Instagram media publisher
//!
//! Instagram publishes in three stages: create a media container, poll the
//! container's status until processing finishes, then exchange the creation
//! id for a durable media id. The polling loop is generic over the status
//! fetch so the stage machine can be exercised without a server.
//!
//! Records in the Instagram posts directory carry no `platforms` tag; the
//! directory itself is the membership test, and published records move to a
//! `posted/` subdirectory instead of being reselected by status.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as Json;
use tokio::time::sleep;

use crate::config::InstagramConfig;
use crate::error::{PlatformError, Result};
use crate::platforms::{Publisher, GRAPH_API_BASE};
use crate::record::PostRecord;

/// Fixed delay between container status polls
pub const IG_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Maximum status polls before the publish times out
pub const IG_MAX_POLLS: u32 = 30;

/// What the record is asking Instagram to host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Media {
    Image(String),
    Video(String),
}

/// Decide the media submission for a record.
///
/// Exactly one of `image_url` / `video_url` must be present, as a public
/// HTTPS URL. Generators sometimes drop a video into the image field; a
/// `.mp4` URL there is treated as video.
pub fn media_for(record: &PostRecord) -> Result<Media> {
    let image = record.image_url().map(str::trim).filter(|s| !s.is_empty());
    let video = record.video_url().map(str::trim).filter(|s| !s.is_empty());

    let media = match (image, video) {
        (Some(_), Some(_)) => {
            return Err(PlatformError::Validation(
                "Record has both image_url and video_url; exactly one is required".to_string(),
            )
            .into());
        }
        (None, None) => {
            return Err(PlatformError::Validation(
                "Record has neither image_url nor video_url".to_string(),
            )
            .into());
        }
        (Some(url), None) if url.to_lowercase().ends_with(".mp4") => Media::Video(url.to_string()),
        (Some(url), None) => Media::Image(url.to_string()),
        (None, Some(url)) => Media::Video(url.to_string()),
    };

    let url = match &media {
        Media::Image(url) | Media::Video(url) => url,
    };
    if !url.starts_with("https://") {
        return Err(PlatformError::Validation(format!(
            "Media URL must be a public https URL, got: {}",
            url
        ))
        .into());
    }

    Ok(media)
}

/// Container processing state reported by the status endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerStatus {
    Finished,
    Error,
    /// Still processing (IN_PROGRESS or any other non-terminal code)
    InProgress(String),
}

impl ContainerStatus {
    pub fn parse(code: &str) -> Self {
        match code {
            "FINISHED" => ContainerStatus::Finished,
            "ERROR" => ContainerStatus::Error,
            other => ContainerStatus::InProgress(other.to_string()),
        }
    }
}

/// Poll `fetch` until the container reports a terminal state.
///
/// Returns the number of polls issued on success. An `ERROR` status aborts
/// immediately; exhausting `max_attempts` without a terminal state is a
/// timeout. The fixed `interval` delay runs only between polls, never after
/// the last one.
pub async fn await_ready<F, Fut>(
    mut fetch: F,
    interval: Duration,
    max_attempts: u32,
) -> Result<u32>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ContainerStatus>>,
{
    for attempt in 1..=max_attempts {
        match fetch().await? {
            ContainerStatus::Finished => return Ok(attempt),
            ContainerStatus::Error => {
                return Err(PlatformError::Posting(
                    "Instagram reported a media processing error".to_string(),
                )
                .into());
            }
            ContainerStatus::InProgress(code) => {
                tracing::debug!(
                    "Container not ready (status {}), poll {}/{}",
                    code,
                    attempt,
                    max_attempts
                );
                if attempt < max_attempts {
                    sleep(interval).await;
                }
            }
        }
    }

    Err(PlatformError::Timeout(format!(
        "Container still processing after {} polls",
        max_attempts
    ))
    .into())
}

fn map_graph_error(status: reqwest::StatusCode, body: &str) -> PlatformError {
    if status == reqwest::StatusCode::UNAUTHORIZED
        || status == reqwest::StatusCode::FORBIDDEN
        || body.contains("OAuthException")
    {
        return PlatformError::Authentication(format!(
            "Instagram rejected the access token ({}): {}",
            status, body
        ));
    }
    PlatformError::Posting(format!("Instagram request failed ({}): {}", status, body))
}

pub struct InstagramPublisher {
    config: InstagramConfig,
    client: reqwest::Client,
    poll_interval: Duration,
    max_polls: u32,
}

impl InstagramPublisher {
    pub fn new(config: InstagramConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            poll_interval: IG_POLL_INTERVAL,
            max_polls: IG_MAX_POLLS,
        }
    }

    async fn graph_post(&self, url: &str, params: &[(&str, &str)]) -> Result<Json> {
        let response = self
            .client
            .post(url)
            .form(params)
            .send()
            .await
            .map_err(|e| PlatformError::Network(format!("Instagram request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            PlatformError::Network(format!("Instagram response read failed: {}", e))
        })?;

        if !status.is_success() {
            return Err(map_graph_error(status, &body).into());
        }

        serde_json::from_str(&body)
            .map_err(|e| {
                PlatformError::Posting(format!("Instagram returned unparsable JSON: {}", e)).into()
            })
    }

    /// Stage 1: submit the media container, returning the creation id.
    async fn create_container(&self, media: &Media, caption: &str) -> Result<String> {
        let url = format!("{}/{}/media", GRAPH_API_BASE, self.config.business_id);
        let json = match media {
            Media::Image(image_url) => {
                self.graph_post(
                    &url,
                    &[
                        ("image_url", image_url.as_str()),
                        ("caption", caption),
                        ("access_token", self.config.access_token.as_str()),
                    ],
                )
                .await?
            }
            Media::Video(video_url) => {
                self.graph_post(
                    &url,
                    &[
                        ("video_url", video_url.as_str()),
                        ("media_type", "REELS"),
                        ("caption", caption),
                        ("access_token", self.config.access_token.as_str()),
                    ],
                )
                .await?
            }
        };

        json.get("id")
            .and_then(Json::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                PlatformError::Posting(format!(
                    "Container create response had no id: {}",
                    json
                ))
                .into()
            })
    }

    /// Stage 2 fetch: one status_code query for the container.
    async fn fetch_status(&self, creation_id: &str) -> Result<ContainerStatus> {
        let url = format!(
            "{}/{}?fields=status_code&access_token={}",
            GRAPH_API_BASE, creation_id, self.config.access_token
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PlatformError::Network(format!("Instagram status poll failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            PlatformError::Network(format!("Instagram response read failed: {}", e))
        })?;

        if !status.is_success() {
            return Err(map_graph_error(status, &body).into());
        }

        let json: Json = serde_json::from_str(&body).map_err(|e| {
            PlatformError::Posting(format!("Instagram returned unparsable JSON: {}", e))
        })?;
        let code = json
            .get("status_code")
            .and_then(Json::as_str)
            .ok_or_else(|| {
                PlatformError::Posting(format!("Status response had no status_code: {}", body))
            })?;

        Ok(ContainerStatus::parse(code))
    }

    /// Stage 3: exchange the ready creation id for a durable media id.
    async fn publish_container(&self, creation_id: &str) -> Result<String> {
        let url = format!(
            "{}/{}/media_publish",
            GRAPH_API_BASE, self.config.business_id
        );
        let json = self
            .graph_post(
                &url,
                &[
                    ("creation_id", creation_id),
                    ("access_token", self.config.access_token.as_str()),
                ],
            )
            .await?;

        json.get("id")
            .and_then(Json::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                PlatformError::Posting(format!("media_publish response had no id: {}", json)).into()
            })
    }
}

#[async_trait]
impl Publisher for InstagramPublisher {
    fn name(&self) -> &str {
        "instagram"
    }

    fn id_field(&self) -> &str {
        "ig_media_id"
    }

    fn character_limit(&self) -> Option<usize> {
        None
    }

    fn validate(&self, record: &PostRecord) -> Result<()> {
        media_for(record).map(|_| ())
    }

    async fn publish(&self, record: &PostRecord) -> Result<String> {
        let media = media_for(record)?;
        let caption = record.caption().unwrap_or("");

        let creation_id = self.create_container(&media, caption).await?;
        tracing::info!("Container created: {}", creation_id);

        let polls = await_ready(
            || self.fetch_status(&creation_id),
            self.poll_interval,
            self.max_polls,
        )
        .await?;
        tracing::debug!("Container ready after {} poll(s)", polls);

        let media_id = self.publish_container(&creation_id).await?;
        tracing::info!("Published to Instagram: {}", media_id);
        Ok(media_id)
    }

    fn archive_after_publish(&self) -> bool {
        true
    }
}
