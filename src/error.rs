//! Error types for the nuancier_extract library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for nuancier_extract operations
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Error types for chart extraction and reconciliation
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Source document could not be opened, or a page index is out of range
    #[error("Document error: {message}")]
    DocumentError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Image data could not be decoded
    #[error("Decode error: {message}")]
    DecodeError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Extracted swatch count does not match the expected code count
    #[error("Count mismatch in {context}: expected {expected}, got {actual}")]
    CountMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// Remote catalog call failed
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Rename source missing at its expected pre-rename location
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Optical character recognition failed
    #[error("OCR error: {message}")]
    OcrError { message: String },

    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    /// Create a document error without a source
    pub fn document(message: impl Into<String>) -> Self {
        Self::DocumentError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a document error with context
    pub fn document_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::DocumentError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a decode error with context
    pub fn decode<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::DecodeError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a network error with context
    pub fn network<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::NetworkError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if this error indicates a per-item condition the run can survive.
    ///
    /// Recoverable errors are logged with the offending item named and the
    /// run continues; structural errors abort the whole pipeline.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExtractionError::CountMismatch { .. }
                | ExtractionError::OcrError { .. }
                | ExtractionError::NetworkError { .. }
                | ExtractionError::FileNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        let err = ExtractionError::CountMismatch {
            context: "page 3".to_string(),
            expected: 28,
            actual: 26,
        };
        assert!(err.is_recoverable());

        let err = ExtractionError::document("cannot open document");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_file_not_found_display() {
        let err = ExtractionError::FileNotFound {
            path: PathBuf::from("page-1/color_01.png"),
        };
        assert!(err.to_string().contains("color_01.png"));
    }
}
