// ABOUTME: Error types for the slidedeck compiler
// ABOUTME: Provides structured error handling for each stage of the pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to write file {path:?}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid extension: {0}")]
    InvalidExtension(String),

    #[error("Macro already registered: {0}")]
    DuplicateMacro(String),

    #[error("Unknown source encoding: {0}")]
    UnknownEncoding(String),

    #[error("{0}")]
    UserMessage(String),

    #[error("Template error: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

impl DeckError {
    /// Whether the error comes from touching the file system
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            DeckError::FileReadError(_)
                | DeckError::FileWriteError { .. }
                | DeckError::PathNotFoundError(_)
        )
    }
}

// Implement conversion from anyhow::Error to our DeckError
impl From<anyhow::Error> for DeckError {
    fn from(err: anyhow::Error) -> Self {
        DeckError::UnknownError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_classification() {
        let missing = DeckError::PathNotFoundError(PathBuf::from("foo.md"));
        assert!(missing.is_io());

        let read = DeckError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(read.is_io());

        assert!(!DeckError::UnsupportedFormat(".txt".to_string()).is_io());
        assert!(!DeckError::UserMessage("boom".to_string()).is_io());
    }

    #[test]
    fn test_user_message_display() {
        let err = DeckError::UserMessage("Image not found".to_string());
        assert_eq!(err.to_string(), "Image not found");
    }
}
