//! Error types for the conversion crate.

use thiserror::Error;

/// Errors raised by a conversion engine as a whole.
///
/// Per-row failures are not errors: they surface as a
/// [`ConversionRecord`](crate::ConversionRecord) without a payload.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to start conversion engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to communicate with conversion engine: {0}")]
    Io(#[from] std::io::Error),

    /// The engine ran and rejected the input (bad mappings, unparsable CSV).
    #[error("{0}")]
    Engine(String),

    #[error("Malformed engine output: {0}")]
    MalformedOutput(String),

    #[error("Invalid BUFR payload in record {index}: {message}")]
    InvalidPayload { index: usize, message: String },
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConversionError>;
