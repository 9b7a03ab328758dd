//! Per-file change detection.
//!
//! Every watched file gets one detector task. On each cycle the task sleeps
//! for its entry's current tier interval, stats the file, and classifies the
//! result:
//!
//! - **deleted** (stat raced with removal, or link count hit zero): the
//!   entry is unregistered and the task exits. No broadcast.
//! - **modified** (full-precision mtime differs from the stored snapshot):
//!   the snapshot is refreshed, the entry is escalated to the fast tier
//!   (first time only), and one change signal is emitted.
//! - **unchanged**: nothing happens.
//!
//! The tier is re-read every cycle, so an escalation takes effect on the
//! very next sleep. Tasks are independent: a hung stat on one path cannot
//! delay detection on any other path.

use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::notify::ChangeNotifier;
use crate::registry::{FileSnapshot, WatchRegistry};

/// Outcome of comparing two successive metadata snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Nothing observable changed.
    Unchanged,
    /// The modification time moved.
    Modified,
    /// The file is gone (link count zero).
    Deleted,
}

/// Classifies the current snapshot against the previously stored one.
///
/// The deletion signal wins over the modification signal: a vanished file
/// whose metadata also moved is still just deleted.
#[must_use]
pub fn classify(previous: &FileSnapshot, current: &FileSnapshot) -> Classification {
    if current.nlink == 0 {
        Classification::Deleted
    } else if current.mtime != previous.mtime {
        Classification::Modified
    } else {
        Classification::Unchanged
    }
}

/// Spawns the polling task for a newly registered path.
///
/// The task runs until the path is unregistered (its token is cancelled)
/// or it detects the deletion itself.
pub(crate) fn spawn(
    path: Utf8PathBuf,
    registry: Arc<WatchRegistry>,
    notifier: Arc<dyn ChangeNotifier>,
    normal_interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            // Tier re-read each cycle so escalation shortens the next sleep.
            let Some(tier) = registry.tier_of(&path) else {
                break;
            };

            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(tier.interval(normal_interval)) => {}
            }

            if !poll_once(&path, &registry, notifier.as_ref()).await {
                break;
            }
        }
        tracing::trace!(path = %path, "Detector task stopped");
    })
}

/// Runs a single detection cycle. Returns `false` when the entry is gone
/// and the task should exit.
async fn poll_once(
    path: &Utf8PathBuf,
    registry: &WatchRegistry,
    notifier: &dyn ChangeNotifier,
) -> bool {
    let Some(previous) = registry.snapshot_of(path) else {
        return false;
    };

    // metadata() follows symlinks, so a watched link tracks its target.
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            // Disappeared between cycles: same as a deletion, not an error.
            registry.unregister(path);
            tracing::debug!(path = %path, "Watched file removed");
            return false;
        }
        Err(error) => {
            // Transient stat failure: skip this cycle, keep watching.
            tracing::warn!(path = %path, error = %error, "Stat failed; will retry");
            return true;
        }
    };

    let current = match FileSnapshot::of(&metadata) {
        Ok(current) => current,
        Err(error) => {
            tracing::warn!(path = %path, error = %error, "Metadata unusable; will retry");
            return true;
        }
    };

    match classify(&previous, &current) {
        Classification::Deleted => {
            registry.unregister(path);
            tracing::debug!(path = %path, "Watched file removed");
            false
        }
        Classification::Modified => {
            registry.refresh_snapshot(path, current);
            if registry.escalate(path) {
                tracing::debug!(path = %path, "Promoted to fast polling");
            }
            notifier.notify_changed();
            tracing::debug!(path = %path, "Stylesheet modified");
            true
        }
        Classification::Unchanged => true,
    }
}
