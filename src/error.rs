//! Error handling for the CarsCube core

use std::fmt;
use thiserror::Error;

/// Unified error type for the CarsCube core
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Upload rejected before preprocessing (bad file type or size)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The source image could not be decoded
    #[error("Image read error: {0}")]
    Read(String),

    /// The preprocessed image could not be re-encoded
    #[error("Image encode error: {0}")]
    Encode(String),

    /// Failure at the vision model boundary (credentials, network, schema)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Storage write failure
    #[error("Persist error: {0}")]
    Persist(String),

    /// Detail lookup for a report id that was never saved
    #[error("Report not found: {0}")]
    NotFound(String),

    /// The user has no credits left to spend on a scan
    #[error("Insufficient credits")]
    InsufficientCredits,

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new image read error
    pub fn read<T: fmt::Display>(msg: T) -> Self {
        Error::Read(msg.to_string())
    }

    /// Create a new image encode error
    pub fn encode<T: fmt::Display>(msg: T) -> Self {
        Error::Encode(msg.to_string())
    }

    /// Create a new analysis error
    pub fn analysis<T: fmt::Display>(msg: T) -> Self {
        Error::Analysis(msg.to_string())
    }

    /// Create a new persist error
    pub fn persist<T: fmt::Display>(msg: T) -> Self {
        Error::Persist(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }
}
