//! The watch engine: rescan scheduling and detector lifecycle.
//!
//! [`WatchEngine`] ties the pieces together. On a fixed cadence it walks
//! every configured root, registers newly discovered stylesheets, and spawns
//! one detector task per registration. Files that disappear are handled by
//! their own detectors, never by the rescan.

use std::sync::Arc;

use sw_core::{StylesheetExtensions, WatchConfig};
use tokio_util::sync::CancellationToken;

use crate::detector;
use crate::error::WalkFailure;
use crate::notify::ChangeNotifier;
use crate::registry::{FileSnapshot, WatchRegistry};
use crate::walker::walk_tree;

/// What one rescan pass accomplished.
#[derive(Debug, Default)]
pub struct RescanSummary {
    /// Stylesheets registered for the first time during this pass.
    pub new_files: usize,

    /// Total files under watch after the pass.
    pub total_watched: usize,

    /// Directories that could not be read during the pass.
    pub errors: Vec<WalkFailure>,
}

/// Discovers stylesheets under the configured roots and keeps them polled.
///
/// The engine owns the [`WatchRegistry`] and the notifier; detector tasks
/// borrow both through `Arc`. Dropping the engine does not stop detectors;
/// cancel the token passed to [`run`](Self::run), or unregister paths, to
/// wind them down.
pub struct WatchEngine {
    config: WatchConfig,
    registry: Arc<WatchRegistry>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl WatchEngine {
    /// Creates an engine over the given roots, extension set, and notifier.
    #[must_use]
    pub fn new(
        config: WatchConfig,
        extensions: StylesheetExtensions,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            config,
            registry: Arc::new(WatchRegistry::new(extensions)),
            notifier,
        }
    }

    /// Returns the shared registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<WatchRegistry> {
        &self.registry
    }

    /// Walks every root once, registering stylesheets that are not yet
    /// watched and spawning a detector task for each.
    ///
    /// Emits exactly one change signal when the pass registered at least one
    /// new file, and none otherwise. Unreadable directories are reported in
    /// the summary; they never abort the pass.
    pub async fn rescan(&self) -> RescanSummary {
        let mut summary = RescanSummary::default();

        for root in &self.config.roots {
            let mut outcome = walk_tree(root).await;
            for failure in &outcome.errors {
                tracing::warn!(error = %failure, "Rescan skipped a directory");
            }
            summary.errors.append(&mut outcome.errors);

            for path in outcome.files {
                if !self.registry.is_candidate(&path) {
                    continue;
                }

                let snapshot = match tokio::fs::metadata(&path).await {
                    Ok(metadata) => match FileSnapshot::of(&metadata) {
                        Ok(snapshot) => snapshot,
                        Err(error) => {
                            tracing::warn!(path = %path, error = %error, "Metadata unusable");
                            continue;
                        }
                    },
                    // Deleted between walk and stat: the next rescan will
                    // pick it up if it comes back.
                    Err(error) => {
                        tracing::debug!(path = %path, error = %error, "Stat failed during rescan");
                        continue;
                    }
                };

                if let Some(cancel) = self.registry.register_if_absent(&path, snapshot) {
                    tracing::debug!(path = %path, "Watching stylesheet");
                    // The task unwinds itself on deletion or cancellation;
                    // its handle is not tracked.
                    let _detector = detector::spawn(
                        path,
                        Arc::clone(&self.registry),
                        Arc::clone(&self.notifier),
                        self.config.poll_interval(),
                        cancel,
                    );
                    summary.new_files += 1;
                }
            }
        }

        summary.total_watched = self.registry.len();

        // One coalesced signal per pass, regardless of how many files
        // appeared; clients reload everything anyway.
        if summary.new_files > 0 {
            self.notifier.notify_changed();
        }

        summary
    }

    /// Runs the engine until `shutdown` is cancelled.
    ///
    /// Performs an initial rescan immediately, then repeats on the configured
    /// rescan interval. On shutdown every remaining entry is unregistered,
    /// so no detector task outlives the call.
    pub async fn run(&self, shutdown: CancellationToken) {
        self.run_with(shutdown, |_| {}).await;
    }

    /// Like [`run`](Self::run), invoking `on_rescan` with each pass's
    /// summary.
    ///
    /// The engine itself does not log rescan counts; callers that want
    /// operator-facing output hook it in here.
    pub async fn run_with<F>(&self, shutdown: CancellationToken, mut on_rescan: F)
    where
        F: FnMut(&RescanSummary),
    {
        let interval = self.config.rescan_interval();
        tracing::info!(
            roots = ?self.config.roots,
            rescan_interval = ?interval,
            poll_interval = ?self.config.poll_interval(),
            "Watch engine started"
        );

        loop {
            let summary = self.rescan().await;
            on_rescan(&summary);

            tokio::select! {
                () = shutdown.cancelled() => break,
                () = tokio::time::sleep(interval) => {}
            }
        }

        // Detectors are keyed to their entries, not to the run token; drop
        // every entry so their tasks stop with the engine.
        self.registry.clear();
        tracing::info!("Watch engine stopped");
    }
}
