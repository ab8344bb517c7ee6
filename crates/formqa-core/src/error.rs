//! Error types for FormQA

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormqaError {
    // Input errors
    #[error("Cannot read spreadsheet: {reason}")]
    Spreadsheet { reason: String },

    #[error("Nothing to do: {what} is empty")]
    EmptyInput { what: String },

    // Upstream service errors
    #[error("{service} returned HTTP {status}: {body}")]
    Upstream {
        service: String,
        status: u16,
        body: String,
    },

    #[error("Request to {service} failed: {reason}")]
    Transport { service: String, reason: String },

    // Answer post-processing errors
    #[error("No valid JSON object found in the model reply: {reason}")]
    ExtractionFailed { reason: String },

    #[error("Failed to export record: {reason}")]
    Export { reason: String },

    // Index errors
    #[error("Index not built. Upload a spreadsheet first")]
    IndexNotBuilt,

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FormqaError {
    /// Shorthand for an empty-input validation error
    pub fn empty(what: impl Into<String>) -> Self {
        Self::EmptyInput { what: what.into() }
    }

    /// Whether the error came from a remote service rather than local input
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::Transport { .. })
    }
}

impl From<serde_json::Error> for FormqaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FormqaError>;
