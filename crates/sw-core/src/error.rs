//! Error types for the sw-core crate.
//!
//! This module provides the [`ConfigError`] type for startup configuration
//! failures. Configuration errors are the only fatal error class in the
//! system: they are reported to the operator before any watching begins.

use camino::Utf8PathBuf;

/// Errors that can occur during configuration validation.
///
/// # Examples
///
/// ```
/// use sw_core::ConfigError;
/// use camino::Utf8PathBuf;
///
/// let error = ConfigError::MissingRoot(Utf8PathBuf::from("/srv/www"));
/// assert!(error.to_string().contains("/srv/www"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A watched root directory does not exist.
    #[error("path not found: {0}")]
    MissingRoot(Utf8PathBuf),

    /// A watched root path exists but is not a directory.
    #[error("path is not a directory: {0}")]
    NotADirectory(Utf8PathBuf),

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// An I/O error occurred while validating configuration.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Creates an [`ConfigError::InvalidOption`] error.
    #[inline]
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_root_display() {
        let error = ConfigError::MissingRoot(Utf8PathBuf::from("/missing/dir"));
        assert_eq!(error.to_string(), "path not found: /missing/dir");
    }

    #[test]
    fn test_not_a_directory_display() {
        let error = ConfigError::NotADirectory(Utf8PathBuf::from("/etc/passwd"));
        assert_eq!(error.to_string(), "path is not a directory: /etc/passwd");
    }

    #[test]
    fn test_invalid_option_display() {
        let error = ConfigError::invalid_option("refresh", "must be positive");
        let msg = error.to_string();
        assert!(msg.contains("refresh"));
        assert!(msg.contains("must be positive"));
    }
}
