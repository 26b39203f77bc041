//! Reset posted records back to ready
//!
//! Rewinds the publish state machine for a whole tree, typically after a
//! test run against a sandbox account. Only the result fields added by
//! `mark_posted` are removed; bodies and authored fields stay put.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::record::{PostRecord, PostStatus};

/// Reset every posted record under `root` to `ready`.
///
/// Walks `*.md` files recursively, so archived records under `posted/`
/// directories are rewound too. Returns the number of files changed. A
/// missing root is treated as an empty tree, and running twice changes
/// nothing the second time.
pub fn reset_all(root: &Path) -> Result<usize> {
    let mut paths = Vec::new();
    collect_markdown(root, &mut paths);
    paths.sort();

    let mut changed = 0;
    for path in paths {
        let mut record = match PostRecord::load(&path) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable record {}: {}", path.display(), e);
                continue;
            }
        };
        if record.status() != PostStatus::Posted {
            continue;
        }

        record.front.set("status", "ready");
        record.front.remove("posted_at");
        record
            .front
            .remove_matching(|key| key.ends_with("_post_id") || key.ends_with("_media_id"));

        std::fs::write(&path, record.render()).map_err(|source| StoreError::Write {
            path: path.display().to_string(),
            source,
        })?;
        debug!("Reset {} to ready", path.display());
        changed += 1;
    }

    info!("Reset {} record(s) under {}", changed, root.display());
    Ok(changed)
}

fn collect_markdown(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            collect_markdown(&path, out);
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
        {
            out.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::FrontMatter;
    use tempfile::TempDir;

    #[test]
    fn test_reset_posted_record() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.md");
        std::fs::write(
            &path,
            "---\nstatus: posted\nplatforms: [x]\nposted_at: 2026-08-01T12:00:00Z\nx_post_id: 1874\n---\nhello",
        )
        .unwrap();

        let changed = reset_all(tmp.path()).unwrap();
        assert_eq!(changed, 1);

        let (front, body) = FrontMatter::parse(&std::fs::read_to_string(&path).unwrap());
        assert_eq!(front.get_text("status"), Some("ready"));
        assert_eq!(front.get_text("posted_at"), None);
        assert_eq!(front.get_text("x_post_id"), None);
        assert_eq!(front.get_list("platforms"), vec!["x".to_string()]);
        assert_eq!(body, "hello");
    }

    #[test]
    fn test_reset_strips_media_id() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.md");
        std::fs::write(
            &path,
            "---\nstatus: posted\nposted_at: 2026-08-01T12:00:00Z\nig_media_id: 17900\nimage_url: https://example.com/a.jpg\n---\ncaption",
        )
        .unwrap();

        reset_all(tmp.path()).unwrap();

        let (front, _) = FrontMatter::parse(&std::fs::read_to_string(&path).unwrap());
        assert_eq!(front.get_text("ig_media_id"), None);
        assert_eq!(
            front.get_text("image_url"),
            Some("https://example.com/a.jpg")
        );
    }

    #[test]
    fn test_reset_walks_posted_subdirectory() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("posted");
        std::fs::create_dir(&archive).unwrap();
        std::fs::write(
            archive.join("a.md"),
            "---\nstatus: posted\nposted_at: 2026-08-01T12:00:00Z\nfb_post_id: 1_2\n---\nbody",
        )
        .unwrap();

        assert_eq!(reset_all(tmp.path()).unwrap(), 1);
    }

    #[test]
    fn test_reset_leaves_ready_and_draft_alone() {
        let tmp = TempDir::new().unwrap();
        let ready = "---\nstatus: ready\nplatforms: [x]\n---\nbody";
        let draft = "---\nstatus: draft\n---\nbody";
        std::fs::write(tmp.path().join("a.md"), ready).unwrap();
        std::fs::write(tmp.path().join("b.md"), draft).unwrap();

        assert_eq!(reset_all(tmp.path()).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(tmp.path().join("a.md")).unwrap(), ready);
        assert_eq!(std::fs::read_to_string(tmp.path().join("b.md")).unwrap(), draft);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("a.md"),
            "---\nstatus: posted\nposted_at: 2026-08-01T12:00:00Z\nli_post_id: urn:li:share:1\n---\nbody",
        )
        .unwrap();

        assert_eq!(reset_all(tmp.path()).unwrap(), 1);
        let after_first = std::fs::read_to_string(tmp.path().join("a.md")).unwrap();
        assert_eq!(reset_all(tmp.path()).unwrap(), 0);
        let after_second = std::fs::read_to_string(tmp.path().join("a.md")).unwrap();
        assert_eq!(after_first, after_second);
    }

    #[test]
    fn test_reset_missing_root_is_zero() {
        assert_eq!(reset_all(Path::new("/nonexistent/posts")).unwrap(), 0);
    }
}
