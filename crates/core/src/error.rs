//! Error types for outline handling and deck generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to create, write, list, or remove a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The deck builder did not complete.
    #[error("Deck builder failed: {0}")]
    BuilderError(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML writing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// Unknown outline style name.
    #[error("Unknown outline style: {0}")]
    UnknownStyle(String),
}
