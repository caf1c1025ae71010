// File: src/error.rs
use thiserror::Error;

/// Errors raised while opening dictionaries, reading configuration or
/// parsing key specifications. Query paths never produce these.
#[derive(Debug, Error)]
pub enum ImeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed dictionary payload: {0}")]
    Format(#[from] bincode::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The payload decoded but does not carry our magic number or a
    /// supported format version.
    #[error("unsupported dictionary header in {path}: {reason}")]
    BadHeader { path: String, reason: String },

    #[error("{path}: range {offset}+{length} runs past the end of a {file_len} byte file")]
    OutOfBounds { path: String, offset: u64, length: u64, file_len: u64 },

    #[error(transparent)]
    KeySpec(#[from] KeySpecError),
}

/// Errors for malformed punctuation/key specifications.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeySpecError {
    #[error("empty label: {0:?}")]
    EmptyLabel(String),

    #[error("empty output text: {0:?}")]
    EmptyOutputText(String),

    #[error("multiple '|' in key spec: {0:?}")]
    MultipleLabelEnd(String),

    #[error("unknown key code name: {0:?}")]
    UnknownCode(String),

    #[error("bad hexadecimal code point: {0:?}")]
    BadHexCode(String),
}

pub type Result<T> = std::result::Result<T, ImeError>;

/// Why waiting for the main dictionary ended without it being loaded.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoadWaitError {
    /// The loader went away before finishing.
    #[error("interrupted while waiting for the main dictionary to load")]
    Interrupted,
}
