//! Configuration for Pagecast
//!
//! Credentials and paths are read from the environment exactly once, at
//! process entry, into an explicit `Config` that is passed into publishers.
//! Business logic never reaches back into the environment. A missing
//! credential fails here, before any network call.

use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::platforms::PlatformKind;

#[derive(Debug, Clone)]
pub struct Config {
    pub posts_dir: PathBuf,
    pub credentials: Credentials,
}

/// Credentials for the one platform this invocation publishes to
#[derive(Debug, Clone)]
pub enum Credentials {
    Facebook(FacebookConfig),
    Instagram(InstagramConfig),
    Linkedin(LinkedinConfig),
    X(XConfig),
}

#[derive(Debug, Clone)]
pub struct FacebookConfig {
    pub page_id: String,
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct InstagramConfig {
    pub business_id: String,
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct LinkedinConfig {
    /// Author URN, e.g. "urn:li:person:XXXX"
    pub author_urn: String,
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct XConfig {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl Config {
    /// Build the configuration for one platform from the environment.
    ///
    /// `posts_dir` overrides the default location (`posts/`, or
    /// `posts/instagram/` for Instagram); `PAGECAST_POSTS_DIR` sits between
    /// the two. Tilde paths are expanded.
    pub fn from_env(platform: PlatformKind, posts_dir: Option<&str>) -> Result<Self> {
        let credentials = match platform {
            PlatformKind::Facebook => Credentials::Facebook(FacebookConfig {
                page_id: require_env("FB_PAGE_ID")?,
                access_token: require_env("FB_ACCESS_TOKEN")?,
            }),
            PlatformKind::Instagram => Credentials::Instagram(InstagramConfig {
                business_id: require_env("IG_BUSINESS_ID")?,
                access_token: require_env("IG_ACCESS_TOKEN")?,
            }),
            PlatformKind::Linkedin => Credentials::Linkedin(LinkedinConfig {
                author_urn: require_env("LINKEDIN_AUTHOR_URN")?,
                access_token: require_env("LINKEDIN_ACCESS_TOKEN")?,
            }),
            PlatformKind::X => Credentials::X(XConfig {
                api_key: require_env("X_API_KEY")?,
                api_secret: require_env("X_API_SECRET")?,
                access_token: require_env("X_ACCESS_TOKEN")?,
                access_token_secret: require_env("X_ACCESS_TOKEN_SECRET")?,
            }),
        };

        Ok(Self {
            posts_dir: resolve_posts_dir(platform, posts_dir),
            credentials,
        })
    }
}

/// Resolve the posts directory: CLI flag, then `PAGECAST_POSTS_DIR`, then
/// the platform default.
pub fn resolve_posts_dir(platform: PlatformKind, cli_override: Option<&str>) -> PathBuf {
    let raw = cli_override
        .map(|s| s.to_string())
        .or_else(|| std::env::var("PAGECAST_POSTS_DIR").ok())
        .unwrap_or_else(|| platform.default_posts_dir().to_string());
    PathBuf::from(shellexpand::tilde(&raw).to_string())
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::MissingEnv(name.to_string()).into()),
    }
}
