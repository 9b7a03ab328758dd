//! The watch registry: path → watch entry bookkeeping.
//!
//! The registry is the single shared mutable structure in the engine. It
//! exclusively owns every [`WatchEntry`]; detectors and the rescan scheduler
//! mutate entries only through registry operations, each of which is applied
//! atomically under an internal lock. A path is either absent (unwatched) or
//! present with exactly one tier.
//!
//! Cancellation is explicit: every entry carries a
//! [`CancellationToken`] that is triggered on unregistration, so the
//! polling task for a deleted file stops instead of lingering.

use std::time::SystemTime;

use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::Mutex;
use sw_core::{FxHashMap, StylesheetExtensions};
use tokio_util::sync::CancellationToken;

use crate::tier::PollTier;

/// A point-in-time metadata snapshot of a watched file.
///
/// Modification times are compared by full-precision [`SystemTime`]
/// equality, never through a truncated or formatted representation, which
/// would invite false positives and negatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSnapshot {
    /// Last-known modification time.
    pub mtime: SystemTime,

    /// Last-known hard link count. Zero signals the file was removed while
    /// still open somewhere; on platforms without link counts this is 1.
    pub nlink: u64,
}

impl FileSnapshot {
    /// Builds a snapshot from filesystem metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot report a modification time.
    pub fn of(metadata: &std::fs::Metadata) -> std::io::Result<Self> {
        Ok(Self {
            mtime: metadata.modified()?,
            nlink: link_count(metadata),
        })
    }
}

#[cfg(unix)]
fn link_count(metadata: &std::fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.nlink()
}

#[cfg(not(unix))]
fn link_count(_metadata: &std::fs::Metadata) -> u64 {
    // No link count available; deletion is detected via NotFound instead.
    1
}

/// One tracked file.
#[derive(Debug)]
struct WatchEntry {
    tier: PollTier,
    snapshot: FileSnapshot,
    cancel: CancellationToken,
}

/// Mapping from absolute path to watch entry.
///
/// All operations are atomic with respect to each other: a detector callback
/// never observes a half-applied registration, tier change, or removal.
///
/// # Examples
///
/// ```
/// use std::time::SystemTime;
///
/// use camino::Utf8Path;
/// use sw_core::StylesheetExtensions;
/// use sw_watcher::{FileSnapshot, PollTier, WatchRegistry};
///
/// let registry = WatchRegistry::new(StylesheetExtensions::default());
/// let snapshot = FileSnapshot { mtime: SystemTime::UNIX_EPOCH, nlink: 1 };
///
/// let token = registry.register_if_absent(Utf8Path::new("/www/a.css"), snapshot);
/// assert!(token.is_some());
/// assert_eq!(registry.tier_of(Utf8Path::new("/www/a.css")), Some(PollTier::Normal));
///
/// // Registration is idempotent.
/// assert!(registry.register_if_absent(Utf8Path::new("/www/a.css"), snapshot).is_none());
///
/// // Non-stylesheet extensions are never registered.
/// assert!(registry.register_if_absent(Utf8Path::new("/www/app.js"), snapshot).is_none());
/// ```
#[derive(Debug)]
pub struct WatchRegistry {
    extensions: StylesheetExtensions,
    entries: Mutex<FxHashMap<Utf8PathBuf, WatchEntry>>,
}

impl WatchRegistry {
    /// Creates an empty registry gated on the given extension set.
    #[must_use]
    pub fn new(extensions: StylesheetExtensions) -> Self {
        Self {
            extensions,
            entries: Mutex::new(FxHashMap::default()),
        }
    }

    /// Returns `true` if `path` has a recognized extension and is not
    /// currently watched.
    ///
    /// This is a cheap pre-check for the rescan scheduler; the answer can
    /// race with a concurrent registration, which
    /// [`register_if_absent`](Self::register_if_absent) resolves
    /// authoritatively.
    #[must_use]
    pub fn is_candidate(&self, path: &Utf8Path) -> bool {
        self.extensions.matches(path) && !self.entries.lock().contains_key(path)
    }

    /// Registers `path` in the normal tier if its extension is recognized
    /// and it is not already present.
    ///
    /// Returns the new entry's cancellation token when a registration
    /// occurred, `None` otherwise. Calling this twice for the same path has
    /// no effect beyond the first call.
    #[must_use]
    pub fn register_if_absent(
        &self,
        path: &Utf8Path,
        snapshot: FileSnapshot,
    ) -> Option<CancellationToken> {
        if !self.extensions.matches(path) {
            return None;
        }

        let mut entries = self.entries.lock();
        if entries.contains_key(path) {
            return None;
        }

        let cancel = CancellationToken::new();
        entries.insert(
            path.to_owned(),
            WatchEntry {
                tier: PollTier::Normal,
                snapshot,
                cancel: cancel.clone(),
            },
        );
        Some(cancel)
    }

    /// Removes `path` and cancels its polling task.
    ///
    /// Returns `true` if an entry was removed. Safe to call for paths that
    /// were already unregistered.
    pub fn unregister(&self, path: &Utf8Path) -> bool {
        let removed = self.entries.lock().remove(path);
        match removed {
            Some(entry) => {
                entry.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Returns the current polling tier of `path`, or `None` if unwatched.
    #[must_use]
    pub fn tier_of(&self, path: &Utf8Path) -> Option<PollTier> {
        self.entries.lock().get(path).map(|entry| entry.tier)
    }

    /// Returns the stored metadata snapshot of `path`, or `None` if
    /// unwatched.
    #[must_use]
    pub fn snapshot_of(&self, path: &Utf8Path) -> Option<FileSnapshot> {
        self.entries.lock().get(path).map(|entry| entry.snapshot)
    }

    /// Replaces the stored snapshot for `path`.
    ///
    /// Returns `false` if the path was unregistered in the meantime.
    pub fn refresh_snapshot(&self, path: &Utf8Path, snapshot: FileSnapshot) -> bool {
        match self.entries.lock().get_mut(path) {
            Some(entry) => {
                entry.snapshot = snapshot;
                true
            }
            None => false,
        }
    }

    /// Promotes `path` from the normal to the fast tier.
    ///
    /// The transition is one-way and fires at most once per entry lifetime:
    /// returns `true` only when the tier actually changed.
    pub fn escalate(&self, path: &Utf8Path) -> bool {
        match self.entries.lock().get_mut(path) {
            Some(entry) if entry.tier == PollTier::Normal => {
                entry.tier = PollTier::Fast;
                true
            }
            _ => false,
        }
    }

    /// Removes every entry and cancels each one's polling task.
    ///
    /// Used on engine shutdown so no detector outlives the watch.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        for (_, entry) in entries.drain() {
            entry.cancel.cancel();
        }
    }

    /// Returns the number of watched files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing is being watched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns `true` if `path` is currently watched.
    #[must_use]
    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.entries.lock().contains_key(path)
    }

    /// Returns all watched paths, sorted.
    #[must_use]
    pub fn watched_paths(&self) -> Vec<Utf8PathBuf> {
        let mut paths: Vec<_> = self.entries.lock().keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn snapshot() -> FileSnapshot {
        FileSnapshot {
            mtime: SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            nlink: 1,
        }
    }

    fn registry() -> WatchRegistry {
        WatchRegistry::new(StylesheetExtensions::default())
    }

    #[test]
    fn test_registration_is_idempotent() {
        let registry = registry();
        let path = Utf8Path::new("/www/a.css");

        assert!(registry.register_if_absent(path, snapshot()).is_some());
        assert!(registry.register_if_absent(path, snapshot()).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unrecognized_extensions_never_registered() {
        let registry = registry();

        for path in ["/www/app.js", "/www/index.html", "/www/README"] {
            assert!(registry
                .register_if_absent(Utf8Path::new(path), snapshot())
                .is_none());
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_new_entries_start_normal() {
        let registry = registry();
        let path = Utf8Path::new("/www/theme.scss");

        let _token = registry.register_if_absent(path, snapshot());
        assert_eq!(registry.tier_of(path), Some(PollTier::Normal));
    }

    #[test]
    fn test_escalation_fires_exactly_once() {
        let registry = registry();
        let path = Utf8Path::new("/www/a.css");
        let _token = registry.register_if_absent(path, snapshot());

        assert!(registry.escalate(path));
        assert_eq!(registry.tier_of(path), Some(PollTier::Fast));

        // Second escalation is a no-op.
        assert!(!registry.escalate(path));
        assert_eq!(registry.tier_of(path), Some(PollTier::Fast));
    }

    #[test]
    fn test_escalate_unwatched_path_is_noop() {
        let registry = registry();
        assert!(!registry.escalate(Utf8Path::new("/www/ghost.css")));
    }

    #[test]
    fn test_unregister_cancels_token() {
        let registry = registry();
        let path = Utf8Path::new("/www/a.css");
        let token = registry
            .register_if_absent(path, snapshot())
            .expect("registration should succeed");

        assert!(!token.is_cancelled());
        assert!(registry.unregister(path));
        assert!(token.is_cancelled());
        assert!(!registry.contains(path));

        // Unregistering again is safe.
        assert!(!registry.unregister(path));
    }

    #[test]
    fn test_recreated_path_starts_fresh_in_normal_tier() {
        let registry = registry();
        let path = Utf8Path::new("/www/a.css");

        let _token = registry.register_if_absent(path, snapshot());
        assert!(registry.escalate(path));
        assert!(registry.unregister(path));

        // Same path re-registered: brand-new entry, normal tier again.
        let token = registry.register_if_absent(path, snapshot());
        assert!(token.is_some());
        assert_eq!(registry.tier_of(path), Some(PollTier::Normal));
    }

    #[test]
    fn test_clear_cancels_every_entry() {
        let registry = registry();
        let first = registry
            .register_if_absent(Utf8Path::new("/www/a.css"), snapshot())
            .expect("registration should succeed");
        let second = registry
            .register_if_absent(Utf8Path::new("/www/b.scss"), snapshot())
            .expect("registration should succeed");

        registry.clear();

        assert!(registry.is_empty());
        assert!(first.is_cancelled());
        assert!(second.is_cancelled());
    }

    #[test]
    fn test_refresh_snapshot() {
        let registry = registry();
        let path = Utf8Path::new("/www/a.css");
        let _token = registry.register_if_absent(path, snapshot());

        let newer = FileSnapshot {
            mtime: SystemTime::now(),
            nlink: 1,
        };
        assert!(registry.refresh_snapshot(path, newer));
        assert_eq!(registry.snapshot_of(path), Some(newer));

        assert!(!registry.refresh_snapshot(Utf8Path::new("/www/gone.css"), newer));
    }

    #[test]
    fn test_is_candidate() {
        let registry = registry();
        let path = Utf8Path::new("/www/a.css");

        assert!(registry.is_candidate(path));
        assert!(!registry.is_candidate(Utf8Path::new("/www/app.js")));

        let _token = registry.register_if_absent(path, snapshot());
        assert!(!registry.is_candidate(path));
    }

    #[test]
    fn test_watched_paths_sorted() {
        let registry = registry();
        for path in ["/www/z.css", "/www/a.css", "/www/m.scss"] {
            let _token = registry.register_if_absent(Utf8Path::new(path), snapshot());
        }

        let paths = registry.watched_paths();
        assert_eq!(paths, vec!["/www/a.css", "/www/m.scss", "/www/z.css"]);
    }
}
