//! Error types for the printer library

use thiserror::Error;

/// Errors produced while turning text into an ESC/POS payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Encoding name outside the supported set
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    /// Character with no representation in the target encoding
    #[error("Character {ch:?} at position {position} cannot be encoded as {encoding}")]
    UnsupportedCharacter {
        ch: char,
        /// Index in chars, not bytes
        position: usize,
        encoding: &'static str,
    },
}

/// Result type for encoding operations
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Errors reported by a print sink when a payload is submitted
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Network connection error
    #[error("Connection failed: {0}")]
    Connection(String),

    /// IO error during printing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Printer is offline or unreachable
    #[error("Printer offline: {0}")]
    Offline(String),

    /// Timeout waiting for printer
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid printer configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Sink refused the job
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Windows spooler error
    #[cfg(windows)]
    #[error("Windows spooler error: {0}")]
    Spooler(String),
}

/// Result type for sink submissions
pub type SubmitResult<T> = Result<T, SubmitError>;

/// Errors raised before a request reaches the sequencer
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("No text to print")]
    EmptyText,

    #[error("Copies must be between 1 and 10, got {0}")]
    CopiesOutOfRange(u32),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Background print task panicked or was cancelled
    #[error("Print worker failed: {0}")]
    WorkerFailed(String),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("Missing config: {0}")]
    Missing(&'static str),
}
