//! Error types for palmreader.
//!
//! This module defines all error types used throughout the palmreader crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for palmreader operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Image Errors ===
    /// The request did not carry an image.
    #[error("No image provided")]
    MissingImage,

    /// The image is not a base64 data URL.
    #[error("Invalid image format")]
    InvalidImageFormat,

    /// The image payload exceeds the configured size limit.
    #[error("image payload of {size} bytes exceeds limit of {limit} bytes")]
    ImageTooLarge {
        /// Size of the received payload in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    // === Detection Errors ===
    /// The hosted detector could not be reached or timed out.
    #[error("detector request failed: {0}")]
    DetectorRequest(#[from] reqwest::Error),

    /// The hosted detector answered with a non-success status.
    #[error("detector returned status {status}: {message}")]
    DetectorStatus {
        /// HTTP status code returned by the detector.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to read an input file.
    #[error("failed to read {path}: {source}")]
    FileRead {
        /// Path that couldn't be read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Server Errors ===
    /// Failed to bind the HTTP listener.
    #[error("failed to bind {address}: {source}")]
    Bind {
        /// Address the server tried to bind.
        address: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A specialized Result type for palmreader operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a detector status error.
    #[must_use]
    pub fn detector_status(status: u16, message: impl Into<String>) -> Self {
        Self::DetectorStatus {
            status,
            message: message.into(),
        }
    }

    /// Check if this error was caused by a malformed client request.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingImage | Self::InvalidImageFormat | Self::ImageTooLarge { .. }
        )
    }

    /// Check if this error came from talking to the hosted detector.
    #[must_use]
    pub fn is_detector_error(&self) -> bool {
        matches!(
            self,
            Self::DetectorRequest(_) | Self::DetectorStatus { .. }
        )
    }
}
