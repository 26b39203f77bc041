//! Post selection
//!
//! Scans a posts directory, filters to ready records targeting the requested
//! platform, and picks exactly one per run. Files sort by path name so runs
//! are deterministic; names encode a date and sequence, which makes "first by
//! name" also "oldest first".

use std::path::Path;

use tracing::warn;

use crate::error::Result;
use crate::record::{PostRecord, PostStatus};

/// How platform membership is decided during selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformFilter {
    /// The record's `platforms` list must contain this tag.
    Tag(String),
    /// The directory itself is scoped to one platform (Instagram keeps its
    /// posts under `posts/instagram/`), so any ready record matches.
    DirectoryScoped,
}

impl PlatformFilter {
    fn matches(&self, record: &PostRecord) -> bool {
        match self {
            PlatformFilter::Tag(tag) => record.platforms().iter().any(|p| p == tag),
            PlatformFilter::DirectoryScoped => true,
        }
    }
}

/// Select the next eligible record: the lexicographically first `ready`
/// record in `dir` that satisfies `filter`.
///
/// A missing or empty directory yields `Ok(None)`. Files that cannot be read
/// are skipped with a warning rather than wedging the whole queue; the
/// `posted/` subdirectory is never descended into.
pub fn select_next(dir: &Path, filter: &PlatformFilter) -> Result<Option<PostRecord>> {
    let mut paths = match list_post_files(dir) {
        Some(paths) => paths,
        None => return Ok(None),
    };
    paths.sort();

    for path in paths {
        let record = match PostRecord::load(&path) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable record {}: {}", path.display(), e);
                continue;
            }
        };
        if record.status() == PostStatus::Ready && filter.matches(&record) {
            return Ok(Some(record));
        }
    }

    Ok(None)
}

fn list_post_files(dir: &Path) -> Option<Vec<std::path::PathBuf>> {
    let entries = std::fs::read_dir(dir).ok()?;
    let paths = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
        })
        .collect();
    Some(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_post(dir: &Path, name: &str, status: &str, platforms: &str) {
        let text = format!(
            "---\nstatus: {}\nplatforms: [{}]\n---\n\nBody of {}.\n",
            status, platforms, name
        );
        std::fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn test_select_first_ready_by_name() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "2026-01-01-001.md", "ready", "x");
        write_post(tmp.path(), "2026-01-02-001.md", "posted", "x");
        write_post(tmp.path(), "2026-01-03-001.md", "ready", "x");

        let record = select_next(tmp.path(), &PlatformFilter::Tag("x".to_string()))
            .unwrap()
            .unwrap();
        assert!(record.path.ends_with("2026-01-01-001.md"));
    }

    #[test]
    fn test_posted_records_are_never_selected() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "a.md", "posted", "x");
        write_post(tmp.path(), "b.md", "ready", "x");
        write_post(tmp.path(), "c.md", "ready", "x");

        let record = select_next(tmp.path(), &PlatformFilter::Tag("x".to_string()))
            .unwrap()
            .unwrap();
        assert!(record.path.ends_with("b.md"));
    }

    #[test]
    fn test_platform_tag_filter() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "a.md", "ready", "facebook, linkedin");
        write_post(tmp.path(), "b.md", "ready", "x");

        let record = select_next(tmp.path(), &PlatformFilter::Tag("x".to_string()))
            .unwrap()
            .unwrap();
        assert!(record.path.ends_with("b.md"));

        let record = select_next(tmp.path(), &PlatformFilter::Tag("linkedin".to_string()))
            .unwrap()
            .unwrap();
        assert!(record.path.ends_with("a.md"));
    }

    #[test]
    fn test_no_match_returns_none() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "a.md", "ready", "facebook");
        let result = select_next(tmp.path(), &PlatformFilter::Tag("x".to_string())).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_missing_directory_returns_none() {
        let result = select_next(
            Path::new("/nonexistent/posts"),
            &PlatformFilter::Tag("x".to_string()),
        )
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_empty_directory_returns_none() {
        let tmp = TempDir::new().unwrap();
        let result =
            select_next(tmp.path(), &PlatformFilter::Tag("x".to_string())).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_directory_scoped_filter_ignores_platform_field() {
        let tmp = TempDir::new().unwrap();
        // Instagram records carry no platforms field; the directory decides.
        std::fs::write(
            tmp.path().join("a.md"),
            "---\nstatus: ready\nimage_url: https://example.com/a.jpg\n---\n",
        )
        .unwrap();

        let record = select_next(tmp.path(), &PlatformFilter::DirectoryScoped)
            .unwrap()
            .unwrap();
        assert!(record.path.ends_with("a.md"));
    }

    #[test]
    fn test_posted_subdirectory_is_not_scanned() {
        let tmp = TempDir::new().unwrap();
        let posted = tmp.path().join("posted");
        std::fs::create_dir(&posted).unwrap();
        write_post(&posted, "old.md", "ready", "x");

        let result = select_next(tmp.path(), &PlatformFilter::Tag("x".to_string())).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_non_markdown_files_ignored() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "status: ready").unwrap();
        write_post(tmp.path(), "a.md", "ready", "x");

        let record = select_next(tmp.path(), &PlatformFilter::Tag("x".to_string()))
            .unwrap()
            .unwrap();
        assert!(record.path.ends_with("a.md"));
    }

    #[test]
    fn test_status_missing_is_not_eligible() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.md"), "---\nplatforms: [x]\n---\nbody").unwrap();
        let result = select_next(tmp.path(), &PlatformFilter::Tag("x".to_string())).unwrap();
        assert!(result.is_none());
    }
}
