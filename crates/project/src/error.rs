//! Error types for session persistence (thiserror-based).

use thiserror::Error;

/// Errors that can occur while saving or loading a session snapshot.
#[derive(Error, Debug)]
pub enum PersistError {
    /// File I/O error (read, write, path resolution).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot version is from a newer format than this build knows.
    #[error("Unsupported snapshot version: {version}")]
    UnsupportedVersion { version: u32 },

    /// Snapshot is structurally broken beyond lenient repair.
    #[error("Invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    /// The snapshot file path does not exist or is not a file.
    #[error("Snapshot file not found: {path}")]
    NotFound { path: String },
}

/// Convenience Result type for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = PersistError::UnsupportedVersion { version: 99 };
        assert!(err.to_string().contains("99"));

        let err = PersistError::InvalidSnapshot {
            reason: "root must be an object".into(),
        };
        assert!(err.to_string().contains("root must be an object"));
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let persist_err: PersistError = io_err.into();
        assert!(matches!(persist_err, PersistError::Io(_)));
    }

    #[test]
    fn json_error_conversion() {
        let result: Result<crate::types::SessionSnapshot, _> = serde_json::from_str("not json");
        let json_err = result.unwrap_err();
        let persist_err: PersistError = json_err.into();
        assert!(matches!(persist_err, PersistError::Json(_)));
    }
}
