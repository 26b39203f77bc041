//! Outcome persistence
//!
//! After a publish succeeds the updated record must be durably recorded, or
//! the next run would publish the same content again. The `OutcomeStore`
//! trait separates the state transition (already applied to the record in
//! memory) from how it is persisted: plain filesystem writes, filesystem
//! writes followed by a git commit, or in-memory capture for tests.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

use crate::error::{Result, StoreError};
use crate::record::PostRecord;

/// Durable storage for publish outcomes
pub trait OutcomeStore: Send + Sync {
    /// Write the updated record. When `archive` is set the file also moves
    /// into a `posted/` directory beside its current location. Returns the
    /// record's final path.
    fn persist(&self, record: &PostRecord, archive: bool) -> Result<PathBuf>;

    /// Commit the written outcome. Stores without a commit step return `Ok`.
    fn commit(&self, paths: &[PathBuf], message: &str) -> Result<()>;
}

/// Plain filesystem store: write in place, archive by rename.
pub struct FsStore;

impl FsStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeStore for FsStore {
    fn persist(&self, record: &PostRecord, archive: bool) -> Result<PathBuf> {
        let rendered = record.render();
        std::fs::write(&record.path, rendered).map_err(|source| StoreError::Write {
            path: record.path.display().to_string(),
            source,
        })?;

        if !archive {
            return Ok(record.path.clone());
        }

        let parent = record.path.parent().unwrap_or_else(|| Path::new("."));
        let archive_dir = parent.join("posted");
        std::fs::create_dir_all(&archive_dir).map_err(|source| StoreError::Archive {
            path: archive_dir.display().to_string(),
            source,
        })?;

        let file_name = record
            .path
            .file_name()
            .ok_or_else(|| StoreError::Archive {
                path: record.path.display().to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "record path has no file name",
                ),
            })?;
        let target = archive_dir.join(file_name);
        std::fs::rename(&record.path, &target).map_err(|source| StoreError::Archive {
            path: record.path.display().to_string(),
            source,
        })?;

        tracing::debug!("Archived {} to {}", record.path.display(), target.display());
        Ok(target)
    }

    fn commit(&self, _paths: &[PathBuf], _message: &str) -> Result<()> {
        Ok(())
    }
}

/// Filesystem store that also commits outcomes to git.
///
/// Runs `git add` / `git commit` / `git push` in the repository root. A
/// failure here is reported as `StoreError::Commit`; the file write has
/// already happened, so the outcome survives locally either way.
///
/// Fresh CI checkouts have no committer identity configured, which makes a
/// bare `git commit` fail. `with_author` supplies one per invocation via
/// `git -c` flags without touching the checkout's config.
pub struct GitStore {
    inner: FsStore,
    repo_root: PathBuf,
    push: bool,
    author: Option<(String, String)>,
}

impl GitStore {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            inner: FsStore::new(),
            repo_root: repo_root.into(),
            push: true,
            author: None,
        }
    }

    /// Commit locally without pushing.
    pub fn without_push(mut self) -> Self {
        self.push = false;
        self
    }

    /// Commit as this name and email instead of the checkout's configured
    /// identity.
    pub fn with_author(mut self, name: &str, email: &str) -> Self {
        self.author = Some((name.to_string(), email.to_string()));
        self
    }

    /// Argument list for the commit invocation, author flags included.
    fn commit_args(&self, message: &str) -> Vec<String> {
        let mut args = Vec::new();
        if let Some((name, email)) = &self.author {
            args.push("-c".to_string());
            args.push(format!("user.name={}", name));
            args.push("-c".to_string());
            args.push(format!("user.email={}", email));
        }
        args.push("commit".to_string());
        args.push("-m".to_string());
        args.push(message.to_string());
        args
    }

    fn run_git(&self, verb: &str, args: &[&str]) -> Result<()> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .output()
            .map_err(|e| StoreError::Commit(format!("Failed to run git {}: {}", verb, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StoreError::Commit(format!(
                "git {} failed: {}",
                verb,
                stderr.trim()
            ))
            .into());
        }
        Ok(())
    }
}

impl OutcomeStore for GitStore {
    fn persist(&self, record: &PostRecord, archive: bool) -> Result<PathBuf> {
        self.inner.persist(record, archive)
    }

    fn commit(&self, paths: &[PathBuf], message: &str) -> Result<()> {
        for path in paths {
            let displayed = path.display().to_string();
            // Archived records leave a deleted path behind; `git add -A` on
            // the parent directory stages both sides of the rename.
            let parent = path
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| ".".to_string());
            self.run_git("add", &["add", "-A", &parent])?;
            tracing::debug!("Staged {}", displayed);
        }
        let commit_args = self.commit_args(message);
        let commit_refs: Vec<&str> = commit_args.iter().map(String::as_str).collect();
        self.run_git("commit", &commit_refs)?;
        if self.push {
            self.run_git("push", &["push"])?;
        }
        tracing::info!("Committed outcome: {}", message);
        Ok(())
    }
}

/// In-memory store for tests: captures writes and commits.
#[derive(Default)]
pub struct MemoryStore {
    pub persisted: Arc<Mutex<Vec<(PathBuf, String)>>>,
    pub commits: Arc<Mutex<Vec<String>>>,
    pub fail_persist: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_persist: true,
            ..Default::default()
        }
    }

    pub fn persisted_renders(&self) -> Vec<String> {
        self.persisted
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn commit_messages(&self) -> Vec<String> {
        self.commits.lock().unwrap().clone()
    }
}

impl OutcomeStore for MemoryStore {
    fn persist(&self, record: &PostRecord, archive: bool) -> Result<PathBuf> {
        if self.fail_persist {
            return Err(StoreError::Write {
                path: record.path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "simulated write failure"),
            }
            .into());
        }
        let path = if archive {
            let parent = record.path.parent().unwrap_or_else(|| Path::new("."));
            parent
                .join("posted")
                .join(record.path.file_name().unwrap_or_default())
        } else {
            record.path.clone()
        };
        self.persisted
            .lock()
            .unwrap()
            .push((path.clone(), record.render()));
        Ok(path)
    }

    fn commit(&self, _paths: &[PathBuf], message: &str) -> Result<()> {
        self.commits.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::FrontMatter;
    use tempfile::TempDir;

    fn record_at(path: PathBuf, text: &str) -> PostRecord {
        let (front, body) = FrontMatter::parse(text);
        PostRecord { path, front, body }
    }

    #[test]
    fn test_fs_store_writes_in_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("post.md");
        std::fs::write(&path, "---\nstatus: ready\n---\nhello").unwrap();

        let mut record = PostRecord::load(&path).unwrap();
        record.mark_posted("fb_post_id", "123_456");

        let final_path = FsStore::new().persist(&record, false).unwrap();
        assert_eq!(final_path, path);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("status: posted"));
        assert!(written.contains("fb_post_id: 123_456"));
        assert!(written.ends_with("hello"));
    }

    #[test]
    fn test_fs_store_archives_to_posted_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("post.md");
        std::fs::write(&path, "---\nstatus: ready\n---\ncaption here").unwrap();

        let mut record = PostRecord::load(&path).unwrap();
        record.mark_posted("ig_media_id", "17900000000000000");

        let final_path = FsStore::new().persist(&record, true).unwrap();
        assert_eq!(final_path, dir.path().join("posted").join("post.md"));
        assert!(!path.exists());

        let written = std::fs::read_to_string(&final_path).unwrap();
        assert!(written.contains("ig_media_id: 17900000000000000"));
    }

    #[test]
    fn test_fs_store_write_failure_is_store_error() {
        let record = record_at(
            PathBuf::from("/nonexistent/dir/post.md"),
            "---\nstatus: posted\n---\nhi",
        );
        let result = FsStore::new().persist(&record, false);
        assert!(matches!(
            result,
            Err(crate::PagecastError::Store(StoreError::Write { .. }))
        ));
    }

    #[test]
    fn test_fs_store_commit_is_noop() {
        assert!(FsStore::new()
            .commit(&[PathBuf::from("a.md")], "msg")
            .is_ok());
    }

    #[test]
    fn test_git_store_commit_args_without_author() {
        let store = GitStore::new("/repo");
        assert_eq!(
            store.commit_args("Posted a.md to x"),
            vec!["commit", "-m", "Posted a.md to x"]
        );
    }

    #[test]
    fn test_git_store_commit_args_with_author() {
        // A fresh checkout has no identity; the -c flags must precede the
        // commit subcommand so git picks them up for this invocation.
        let store = GitStore::new("/repo").with_author("pagecast-bot", "bot@example.com");
        assert_eq!(
            store.commit_args("Posted a.md to x"),
            vec![
                "-c",
                "user.name=pagecast-bot",
                "-c",
                "user.email=bot@example.com",
                "commit",
                "-m",
                "Posted a.md to x"
            ]
        );
    }

    #[test]
    fn test_git_store_commit_fails_outside_repo() {
        let dir = TempDir::new().unwrap();
        let store = GitStore::new(dir.path()).without_push();
        let result = store.commit(&[dir.path().join("post.md")], "Posted post.md");
        assert!(matches!(
            result,
            Err(crate::PagecastError::Store(StoreError::Commit(_)))
        ));
    }

    #[test]
    fn test_memory_store_captures_renders_and_commits() {
        let store = MemoryStore::new();
        let record = record_at(
            PathBuf::from("posts/a.md"),
            "---\nstatus: posted\n---\nbody",
        );

        let path = store.persist(&record, false).unwrap();
        assert_eq!(path, PathBuf::from("posts/a.md"));

        store.commit(&[path], "Posted a.md to facebook").unwrap();

        assert_eq!(store.persisted_renders().len(), 1);
        assert!(store.persisted_renders()[0].contains("status: posted"));
        assert_eq!(
            store.commit_messages(),
            vec!["Posted a.md to facebook".to_string()]
        );
    }

    #[test]
    fn test_memory_store_archive_path() {
        let store = MemoryStore::new();
        let record = record_at(
            PathBuf::from("posts/instagram/a.md"),
            "---\nstatus: posted\n---\nbody",
        );
        let path = store.persist(&record, true).unwrap();
        assert_eq!(path, PathBuf::from("posts/instagram/posted/a.md"));
    }

    #[test]
    fn test_memory_store_failing() {
        let store = MemoryStore::failing();
        let record = record_at(PathBuf::from("posts/a.md"), "---\nstatus: posted\n---\nb");
        assert!(store.persist(&record, false).is_err());
    }
}
