//! Run-once publish orchestration
//!
//! One invocation publishes at most one record: select the next eligible
//! file, validate it, publish, apply the success patch, and persist. The
//! record is never mutated before the platform has accepted the post, so a
//! failed run leaves the queue exactly as it found it.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{PagecastError, PlatformError, Result};
use crate::platforms::Publisher;
use crate::selector::{select_next, PlatformFilter};
use crate::store::OutcomeStore;

/// Outcome of a publish run, for CLI output
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    pub path: PathBuf,
    pub platform: String,
    pub post_id: String,
}

/// Publish the next eligible record in `dir`.
///
/// Returns `Ok(None)` when nothing is eligible. A duplicate-content
/// rejection is treated as already published: the record is marked posted
/// (without a platform id) so the queue does not wedge on it.
///
/// # Errors
///
/// Publisher errors propagate without touching the record. Persistence
/// errors propagate after the platform post already exists; these are logged
/// at error level with the post id so the operator can reconcile by hand.
pub async fn publish_next(
    dir: &std::path::Path,
    filter: &PlatformFilter,
    publisher: &dyn Publisher,
    store: &dyn OutcomeStore,
    archive: bool,
) -> Result<Option<PublishReport>> {
    let mut record = match select_next(dir, filter)? {
        Some(record) => record,
        None => {
            info!("No ready posts for {} in {}", publisher.name(), dir.display());
            return Ok(None);
        }
    };

    info!(
        "Publishing {} to {}",
        record.path.display(),
        publisher.name()
    );
    publisher.validate(&record)?;

    let post_id = match publisher.publish(&record).await {
        Ok(post_id) => post_id,
        Err(PagecastError::Platform(PlatformError::Duplicate(msg))) => {
            warn!(
                "{} already exists on {}; recording it as posted: {}",
                record.path.display(),
                publisher.name(),
                msg
            );
            "duplicate".to_string()
        }
        Err(e) => return Err(e),
    };

    record.mark_posted(publisher.id_field(), &post_id);

    let final_path = store
        .persist(&record, archive && publisher.archive_after_publish())
        .map_err(|e| {
            error!(
                "Published to {} as {} but failed to record the outcome for {}: {}",
                publisher.name(),
                post_id,
                record.path.display(),
                e
            );
            e
        })?;

    let file_name = final_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| final_path.display().to_string());
    store
        .commit(
            &[record.path.clone(), final_path.clone()],
            &format!("Posted {} to {}", file_name, publisher.name()),
        )
        .map_err(|e| {
            error!(
                "Published to {} as {} but failed to commit the outcome: {}",
                publisher.name(),
                post_id,
                e
            );
            e
        })?;

    info!("Published {} as {}", final_path.display(), post_id);
    Ok(Some(PublishReport {
        path: final_path,
        platform: publisher.name().to_string(),
        post_id,
    }))
}
