//! Error types for the QA grader.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, GraderError>;

/// Errors that can occur in the QA grader.
#[derive(Error, Debug)]
pub enum GraderError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A work item resolved without any context text file.
    #[error("No context text file for work item '{0}'")]
    MissingContext(String),

    /// The filter file does not exist or is not readable.
    #[error("Filter file not found at '{0}'")]
    FilterFileNotFound(PathBuf),

    /// The input CSV is missing required columns.
    #[error("Input CSV is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// CSV read/write error.
    #[error("CSV error: {0}")]
    Csv(String),

    /// Ollama API error.
    #[error("Ollama API error: {0}")]
    OllamaApi(String),

    /// Grader response parsing error.
    #[error("Failed to parse grader response: {0}")]
    ResponseParse(String),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GraderError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for GraderError {
    fn from(err: reqwest::Error) -> Self {
        GraderError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for GraderError {
    fn from(err: serde_json::Error) -> Self {
        GraderError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for GraderError {
    fn from(err: csv::Error) -> Self {
        GraderError::Csv(err.to_string())
    }
}
