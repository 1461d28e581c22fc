//! Error types for apiary

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for apiary operations
pub type Result<T> = std::result::Result<T, ApiaryError>;

/// Errors that can occur while capturing exchanges or maintaining the catalogue
#[derive(Debug, Error)]
pub enum ApiaryError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A body declared as JSON by its content type failed to parse
    #[error("body declared as {content_type:?} is not valid JSON: {source}")]
    InvalidJsonBody {
        /// The content-type value the body arrived with
        content_type: String,
        /// The underlying parse failure
        #[source]
        source: serde_json::Error,
    },

    /// Catalogue snapshot on disk could not be decoded
    #[error("invalid catalogue snapshot {}: {source}", .path.display())]
    Snapshot {
        /// Path of the snapshot file
        path: PathBuf,
        /// The underlying decode failure
        #[source]
        source: serde_json::Error,
    },

    /// Document template could not be parsed
    #[error("invalid document template: {0}")]
    Template(Box<handlebars::TemplateError>),

    /// Document template failed to render
    #[error("failed to render document: {0}")]
    Render(Box<handlebars::RenderError>),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
