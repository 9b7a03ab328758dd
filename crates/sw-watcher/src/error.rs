//! Error types for the sw-watcher crate.
//!
//! Detection-path errors are deliberately non-fatal: an unreadable subtree
//! surfaces as a [`WalkFailure`] inside a partial walk result, and a file
//! that disappears between listing and stat is classified as deleted rather
//! than reported as an error. The only fatal errors in the system are
//! startup configuration errors, which live in `sw-core`.

use camino::Utf8PathBuf;

/// A directory that could not be read during a tree walk.
///
/// The subtree below `path` was abandoned; sibling subtrees and other roots
/// were still enumerated. No retry is attempted here; the next scheduled
/// rescan naturally retries.
///
/// # Examples
///
/// ```
/// use sw_watcher::WalkFailure;
/// use camino::Utf8PathBuf;
///
/// let failure = WalkFailure {
///     path: Utf8PathBuf::from("/srv/www/private"),
///     error: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
/// };
/// assert!(failure.to_string().contains("/srv/www/private"));
/// ```
#[derive(Debug, thiserror::Error)]
#[error("failed to read directory {path}: {error}")]
pub struct WalkFailure {
    /// The directory that could not be read.
    pub path: Utf8PathBuf,

    /// The underlying I/O error.
    #[source]
    pub error: std::io::Error,
}
