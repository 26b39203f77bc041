//! Post record model
//!
//! A record is one post file: front matter plus body. Records are created by
//! an external generator, selected for publishing while `status: ready`, and
//! mutated exactly once on success (`ready` -> `posted` plus the platform's
//! result fields).

use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::frontmatter::FrontMatter;

/// Lifecycle status of a post record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Ready,
    Posted,
    Draft,
    Unknown,
}

impl PostStatus {
    /// Parse a status field value. Unrecognized or absent values are
    /// `Unknown`, which is never eligible for publishing.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("ready") => PostStatus::Ready,
            Some("posted") => PostStatus::Posted,
            Some("draft") => PostStatus::Draft,
            _ => PostStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Ready => "ready",
            PostStatus::Posted => "posted",
            PostStatus::Draft => "draft",
            PostStatus::Unknown => "unknown",
        }
    }
}

/// One post file: front matter, body, and where it lives on disk
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub path: PathBuf,
    pub front: FrontMatter,
    pub body: String,
}

impl PostRecord {
    /// Load a record from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let (front, body) = FrontMatter::parse(&text);
        Ok(Self {
            path: path.to_path_buf(),
            front,
            body,
        })
    }

    pub fn status(&self) -> PostStatus {
        PostStatus::parse(self.front.get_text("status"))
    }

    /// Platform tags this record targets, lowercased.
    pub fn platforms(&self) -> Vec<String> {
        self.front
            .get_list("platforms")
            .into_iter()
            .map(|p| p.to_lowercase())
            .collect()
    }

    pub fn caption(&self) -> Option<&str> {
        self.front.get_text("caption")
    }

    pub fn title(&self) -> Option<&str> {
        self.front.get_text("title")
    }

    pub fn link(&self) -> Option<&str> {
        self.front.get_text("link")
    }

    pub fn image_url(&self) -> Option<&str> {
        self.front.get_text("image_url")
    }

    pub fn video_url(&self) -> Option<&str> {
        self.front.get_text("video_url")
    }

    /// Apply the success patch: `status: posted`, `posted_at: now`, and the
    /// platform's id field. Body and unrelated fields are untouched.
    pub fn mark_posted(&mut self, id_field: &str, post_id: &str) {
        self.front.set("status", "posted");
        self.front.set(
            "posted_at",
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        );
        self.front.set(id_field, post_id);
    }

    /// Render the record back to file text.
    pub fn render(&self) -> String {
        self.front.render(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_from(text: &str) -> PostRecord {
        let (front, body) = FrontMatter::parse(text);
        PostRecord {
            path: PathBuf::from("posts/2026-01-05-001.md"),
            front,
            body,
        }
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(PostStatus::parse(Some("ready")), PostStatus::Ready);
        assert_eq!(PostStatus::parse(Some("Ready")), PostStatus::Ready);
        assert_eq!(PostStatus::parse(Some("posted")), PostStatus::Posted);
        assert_eq!(PostStatus::parse(Some("draft")), PostStatus::Draft);
        assert_eq!(PostStatus::parse(Some("queued")), PostStatus::Unknown);
        assert_eq!(PostStatus::parse(None), PostStatus::Unknown);
    }

    #[test]
    fn test_platforms_lowercased() {
        let record = record_from("---\nstatus: ready\nplatforms: [Facebook, X]\n---\nhi");
        assert_eq!(
            record.platforms(),
            vec!["facebook".to_string(), "x".to_string()]
        );
    }

    #[test]
    fn test_platforms_absent() {
        let record = record_from("---\nstatus: ready\n---\nhi");
        assert!(record.platforms().is_empty());
    }

    #[test]
    fn test_mark_posted_sets_result_fields() {
        let mut record = record_from("---\nstatus: ready\nplatforms: [x]\n---\nhello world");
        record.mark_posted("x_post_id", "1874000000000000000");

        assert_eq!(record.status(), PostStatus::Posted);
        assert_eq!(
            record.front.get_text("x_post_id"),
            Some("1874000000000000000")
        );
        let posted_at = record.front.get_text("posted_at").unwrap();
        assert!(posted_at.ends_with('Z'));
        assert_eq!(record.body, "hello world");
    }

    #[test]
    fn test_mark_posted_round_trips() {
        let mut record = record_from("---\nstatus: ready\nplatforms: [x]\n---\nhello world");
        record.mark_posted("x_post_id", "42");
        let rendered = record.render();
        let (front, body) = FrontMatter::parse(&rendered);
        assert_eq!(front.get_text("status"), Some("posted"));
        assert_eq!(front.get_text("x_post_id"), Some("42"));
        assert_eq!(body, "hello world");
    }

    #[test]
    fn test_load_missing_file_is_store_error() {
        let result = PostRecord::load(Path::new("/nonexistent/post.md"));
        assert!(matches!(
            result,
            Err(crate::PagecastError::Store(StoreError::Read { .. }))
        ));
    }
}
