//! Error types for calnote.

use thiserror::Error;

/// Top-level result type for calnote operations.
pub type Result<T> = std::result::Result<T, CalnoteError>;

/// Top-level error type for calnote.
#[derive(Debug, Error)]
pub enum CalnoteError {
    #[error("vault error: {0}")]
    Vault(#[from] VaultError),

    #[error("format error: {0}")]
    Format(#[from] FormatError),

    #[error("config error: {0}")]
    Config(String),

    #[error("workspace error: {0}")]
    Workspace(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors surfaced by a vault implementation.
///
/// `AlreadyExists` is kept distinct so callers can recover from a lost
/// create race by re-resolving the existing file.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("file already exists: {0}")]
    AlreadyExists(String),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("vault io error at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl VaultError {
    /// Whether this error reports a file that is already present.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

/// Errors raised while parsing a date with a moment-style format.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("input '{input}' does not match format '{format}'")]
    Mismatch { input: String, format: String },

    #[error("'{input}' is not a valid calendar date for format '{format}'")]
    InvalidDate { input: String, format: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_human_readable_messages() {
        let err = VaultError::AlreadyExists("daily/2026-01-31.md".to_string());
        assert!(err.to_string().contains("daily/2026-01-31.md"));
        assert!(err.is_already_exists());

        let err = FormatError::Mismatch {
            input: "notes".to_string(),
            format: "YYYY-MM-DD".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("notes"));
        assert!(msg.contains("YYYY-MM-DD"));
    }

    #[test]
    fn vault_errors_convert_into_top_level() {
        let err: CalnoteError = VaultError::NotFound("a.md".to_string()).into();
        assert!(matches!(err, CalnoteError::Vault(VaultError::NotFound(_))));
        assert!(err.to_string().starts_with("vault error"));
    }
}
