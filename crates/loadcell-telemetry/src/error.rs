//! Error types for the load-cell telemetry library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while acquiring or parsing telemetry.
#[derive(Error, Debug)]
pub enum Error {
    /// Serial port not found or could not be opened.
    #[error("serial port not found at {0}")]
    PortNotFound(String),

    /// Serial port communication error.
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// Serial I/O error (read or decode failure).
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown sensor format name.
    #[error("unknown sensor format {0:?} (expected dual-load-cell, dual-load-cell-mn, or load-cell-power)")]
    UnknownFormat(String),

    /// Line carried fewer numeric fields than its format requires.
    #[error("expected {expected} numeric fields but found {found} in {line:?}")]
    FieldCount {
        expected: usize,
        found: usize,
        line: String,
    },

    /// A field failed to convert to a floating-point value.
    #[error("invalid numeric field {token:?} in {line:?}: {source}")]
    InvalidNumber {
        token: String,
        line: String,
        source: std::num::ParseFloatError,
    },
}
