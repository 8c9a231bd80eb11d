//! Error types for the timebill-core library.

use thiserror::Error;

/// Main error type for the timebill library.
#[derive(Error, Debug)]
pub enum TimebillError {
    /// Time entry data error.
    #[error(transparent)]
    Entries(#[from] EntryError),

    /// Invoice document rendering error.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An invoice amount does not fit the decimal range.
    #[error("Invoice amount is too large: {0}")]
    AmountOverflow(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to the time entry envelope.
#[derive(Error, Debug)]
pub enum EntryError {
    /// The envelope JSON could not be read.
    #[error("Invalid time entry data")]
    MalformedEnvelope,

    /// The envelope could not be written.
    #[error("failed to serialize time entries: {0}")]
    Serialize(String),
}

/// Errors related to invoice document rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Layout or composition of the document failed.
    #[error("Failed to generate PDF: {0}")]
    GenerationFailed(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        Self::GenerationFailed(err.to_string())
    }
}

/// Result type for the timebill library.
pub type Result<T> = std::result::Result<T, TimebillError>;
