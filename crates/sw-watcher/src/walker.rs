//! Asynchronous directory tree enumeration.
//!
//! [`walk_tree`] produces every regular file reachable from a root by
//! depth-first descent. There is no ignore-list: extension filtering happens
//! later, at registration. Two properties matter here:
//!
//! - **Determinism**: siblings are visited in path order, so two walks of an
//!   unchanged tree yield the same file sequence.
//! - **Failure isolation**: a directory that cannot be read contributes a
//!   [`WalkFailure`] to the outcome and its subtree is abandoned, but sibling
//!   subtrees and the rest of the walk continue.

use camino::{Utf8Path, Utf8PathBuf};
use futures_util::future::BoxFuture;

use crate::error::WalkFailure;

/// The result of walking one root: files found plus per-subtree failures.
///
/// A non-empty `errors` list does not invalidate `files`; the walk always
/// returns whatever it could reach.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// All regular files found, in depth-first path order.
    pub files: Vec<Utf8PathBuf>,

    /// Directories that could not be read.
    pub errors: Vec<WalkFailure>,
}

impl WalkOutcome {
    /// Returns `true` if at least one directory could not be read.
    #[inline]
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Recursively enumerates all regular files under `root`.
///
/// Directories are traversed depth-first with siblings in path order.
/// Symbolic links to files are followed; symlinked directories are not
/// descended into. Entries with non-UTF-8 names are skipped with a
/// warning.
///
/// Never fails as a whole: an unreadable `root` simply produces an outcome
/// with zero files and one error.
pub async fn walk_tree(root: &Utf8Path) -> WalkOutcome {
    let mut outcome = WalkOutcome::default();
    walk_into(root.to_owned(), &mut outcome).await;
    outcome
}

/// One level of descent. Boxed for async recursion.
fn walk_into(dir: Utf8PathBuf, outcome: &mut WalkOutcome) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let mut reader = match tokio::fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(error) => {
                outcome.errors.push(WalkFailure { path: dir, error });
                return;
            }
        };

        // Collect and sort the whole level first so sibling order is
        // deterministic within a pass.
        let mut entries: Vec<(Utf8PathBuf, bool, bool)> = Vec::new();
        loop {
            match reader.next_entry().await {
                Ok(Some(entry)) => {
                    let path = entry.path();
                    let Ok(utf8_path) = Utf8PathBuf::try_from(path) else {
                        tracing::warn!(
                            parent = %dir,
                            "Skipping non-UTF-8 path during walk"
                        );
                        continue;
                    };
                    let (is_dir, is_file) = match entry.file_type().await {
                        // Symlinks to files are followed so a linked
                        // stylesheet is watched like any other; symlinked
                        // directories are not descended into (cycle risk).
                        Ok(ft) if ft.is_symlink() => {
                            match tokio::fs::metadata(&utf8_path).await {
                                Ok(target) => (false, target.is_file()),
                                // Dangling link: nothing to watch.
                                Err(_) => continue,
                            }
                        }
                        Ok(ft) => (ft.is_dir(), ft.is_file()),
                        // Raced with deletion between listing and stat:
                        // treat as absent.
                        Err(_) => continue,
                    };
                    entries.push((utf8_path, is_dir, is_file));
                }
                Ok(None) => break,
                Err(error) => {
                    outcome.errors.push(WalkFailure {
                        path: dir.clone(),
                        error,
                    });
                    break;
                }
            }
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        for (path, is_dir, is_file) in entries {
            if is_dir {
                walk_into(path, outcome).await;
            } else if is_file {
                outcome.files.push(path);
            }
            // Sockets, fifos, and dangling links are not watchable; skip.
        }
    })
}
