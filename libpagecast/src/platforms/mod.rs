//! Platform publishers
//!
//! One publisher per platform, behind a unified trait. Text-only platforms
//! (Facebook, LinkedIn, X) publish in a single call; Instagram runs the full
//! create / await-ready / finalize protocol for asynchronous media
//! processing.

use std::str::FromStr;

use async_trait::async_trait;

use crate::config::{Config, Credentials};
use crate::error::Result;
use crate::record::PostRecord;
use crate::selector::PlatformFilter;

pub mod facebook;
pub mod instagram;
pub mod linkedin;
pub mod x;

// Mock publisher is available for all builds to support integration tests
pub mod mock;

/// Graph API base shared by the Facebook and Instagram publishers
pub(crate) const GRAPH_API_BASE: &str = "https://graph.facebook.com/v24.0";

/// The platforms Pagecast can publish to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    Facebook,
    Instagram,
    Linkedin,
    X,
}

impl PlatformKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Facebook => "facebook",
            PlatformKind::Instagram => "instagram",
            PlatformKind::Linkedin => "linkedin",
            PlatformKind::X => "x",
        }
    }

    /// Where this platform's records live by default. Instagram is scoped by
    /// directory rather than by a `platforms` tag.
    pub fn default_posts_dir(&self) -> &'static str {
        match self {
            PlatformKind::Instagram => "posts/instagram",
            _ => "posts",
        }
    }

    /// How selection decides membership for this platform.
    pub fn filter(&self) -> PlatformFilter {
        match self {
            PlatformKind::Instagram => PlatformFilter::DirectoryScoped,
            _ => PlatformFilter::Tag(self.as_str().to_string()),
        }
    }
}

impl FromStr for PlatformKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "facebook" => Ok(PlatformKind::Facebook),
            "instagram" => Ok(PlatformKind::Instagram),
            "linkedin" => Ok(PlatformKind::Linkedin),
            "x" | "twitter" => Ok(PlatformKind::X),
            _ => Err(format!(
                "Unknown platform: '{}'. Valid options: facebook, instagram, linkedin, x",
                s
            )),
        }
    }
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Publisher trait for platform-specific publish protocols
///
/// Implementations validate a record against platform requirements, then
/// exchange its content for a durable platform post id. Validation never
/// touches the network; a record that fails validation aborts the run before
/// any call is made.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Lowercase platform identifier (e.g. "facebook")
    fn name(&self) -> &str;

    /// Front-matter field the durable id is recorded under (e.g. "fb_post_id")
    fn id_field(&self) -> &str;

    /// Maximum post length, or `None` when the publisher does not truncate
    fn character_limit(&self) -> Option<usize>;

    /// Check the record against platform requirements without any network I/O.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Validation` for a malformed record (missing
    /// media URL, non-HTTPS URL, body below the platform minimum).
    fn validate(&self, record: &PostRecord) -> Result<()>;

    /// Publish the record and return the durable platform post id.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` for credential rejections,
    /// `PlatformError::Posting` for other platform rejections,
    /// `PlatformError::Network` for transport failures, and
    /// `PlatformError::Timeout` when media processing never reaches a
    /// terminal state.
    async fn publish(&self, record: &PostRecord) -> Result<String>;

    /// Whether the record file moves to the `posted/` archive after success.
    /// Platforms that track state through the `status` field alone keep the
    /// file in place.
    fn archive_after_publish(&self) -> bool {
        false
    }
}

/// Create the publisher for the configured platform.
pub fn create_publisher(config: &Config) -> Box<dyn Publisher> {
    match &config.credentials {
        Credentials::Facebook(fb) => Box::new(facebook::FacebookPublisher::new(fb.clone())),
        Credentials::Instagram(ig) => Box::new(instagram::InstagramPublisher::new(ig.clone())),
        Credentials::Linkedin(li) => Box::new(linkedin::LinkedinPublisher::new(li.clone())),
        Credentials::X(x) => Box::new(x::XPublisher::new(x.clone())),
    }
}
