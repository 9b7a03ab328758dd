//! The recognized stylesheet extension set.
//!
//! Only files whose extension appears in this set are ever registered for
//! watching. The default set matches the original tool: `css`, `sass`,
//! `scss`, `less`, `styl`.

use camino::Utf8Path;
use smallvec::SmallVec;

/// Extensions recognized as stylesheets by default.
const DEFAULT_EXTENSIONS: &[&str] = &["css", "sass", "scss", "less", "styl"];

/// The set of file extensions treated as stylesheets.
///
/// Immutable once constructed; shared across the registry and rescan
/// scheduler. Matching is by exact extension (no leading dot), so `a.css`
/// matches but `a.css.bak` does not.
///
/// # Examples
///
/// ```
/// use sw_core::StylesheetExtensions;
/// use camino::Utf8Path;
///
/// let exts = StylesheetExtensions::default();
/// assert!(exts.matches(Utf8Path::new("styles/main.scss")));
/// assert!(!exts.matches(Utf8Path::new("scripts/app.js")));
/// assert!(!exts.matches(Utf8Path::new("Makefile")));
/// ```
#[derive(Debug, Clone)]
pub struct StylesheetExtensions {
    extensions: SmallVec<[String; 8]>,
}

impl StylesheetExtensions {
    /// Creates the default stylesheet extension set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// Creates an extension set from arbitrary extensions (no leading dot).
    #[must_use]
    pub fn from_extensions(extensions: &[&str]) -> Self {
        Self {
            extensions: extensions.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// Adds an extension to the recognized set, ignoring duplicates.
    #[must_use]
    pub fn with_extension(mut self, ext: &str) -> Self {
        if !self.extensions.iter().any(|e| e == ext) {
            self.extensions.push(ext.to_owned());
        }
        self
    }

    /// Returns `true` if the path's extension is in the recognized set.
    #[must_use]
    pub fn matches(&self, path: &Utf8Path) -> bool {
        path.extension()
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    /// Returns the recognized extensions.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.extensions
    }
}

impl Default for StylesheetExtensions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set_matches_all_stylesheet_kinds() {
        let exts = StylesheetExtensions::default();
        for name in ["a.css", "a.sass", "a.scss", "a.less", "a.styl"] {
            assert!(exts.matches(Utf8Path::new(name)), "{name} should match");
        }
    }

    #[test]
    fn test_non_stylesheets_rejected() {
        let exts = StylesheetExtensions::default();
        assert!(!exts.matches(Utf8Path::new("index.html")));
        assert!(!exts.matches(Utf8Path::new("app.js")));
        assert!(!exts.matches(Utf8Path::new("style.css.orig")));
        assert!(!exts.matches(Utf8Path::new("css")));
        assert!(!exts.matches(Utf8Path::new("")));
    }

    #[test]
    fn test_nested_paths_match_by_extension_only() {
        let exts = StylesheetExtensions::default();
        assert!(exts.matches(Utf8Path::new("deep/nested/dir/theme.less")));
        assert!(!exts.matches(Utf8Path::new("css/readme.txt")));
    }

    #[test]
    fn test_with_extension_deduplicates() {
        let exts = StylesheetExtensions::default()
            .with_extension("pcss")
            .with_extension("pcss");
        assert_eq!(
            exts.as_slice().iter().filter(|e| *e == "pcss").count(),
            1
        );
        assert!(exts.matches(Utf8Path::new("a.pcss")));
    }

    #[test]
    fn test_custom_set() {
        let exts = StylesheetExtensions::from_extensions(&["css"]);
        assert!(exts.matches(Utf8Path::new("a.css")));
        assert!(!exts.matches(Utf8Path::new("a.scss")));
    }
}
