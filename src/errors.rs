/*!
 * Error types for the castscript library.
 *
 * This module contains custom error types for the different stages of the
 * transcript lifecycle, using the thiserror crate for ergonomic error definitions.
 * Storage and other infrastructure failures travel as `anyhow::Error`.
 */

use thiserror::Error;

/// Message shown to end users when a captions document cannot be parsed.
/// The detailed reason is kept in the error itself and in the logs.
pub const PARSE_FAILURE_MESSAGE: &str = "Error parsing webvtt file";

/// A structurally invalid WebVTT document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    /// 1-based line number where parsing stopped
    pub line: usize,
    /// Human-readable reason
    pub reason: String,
}

impl ParseError {
    /// Create a parse error at the given line
    pub fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur when fetching a remote transcript asset
#[derive(Error, Debug)]
pub enum AssetError {
    /// No transcript asset is configured
    #[error("No asset is assigned for transcripts yet")]
    NotAssigned,

    /// The asset exists in configuration but the file is absent
    #[error("No transcript file is available: {0}")]
    NotFound(String),

    /// The remote fetch itself failed
    #[error("{0}")]
    Transport(String),
}

/// Errors that can occur while importing a transcript
#[derive(Error, Debug)]
pub enum ImportError {
    /// Input bytes are not valid UTF-8
    #[error("Error parsing webvtt file: must be UTF-8 encoded ({0})")]
    Encoding(#[from] std::str::Utf8Error),

    /// The captions document is structurally invalid
    #[error("Error parsing webvtt file: {0}")]
    Parse(#[from] ParseError),

    /// Episode, asset or file absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote asset fetch failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// The storage layer failed
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl ImportError {
    /// Message safe to surface to an end user.
    ///
    /// Parse failures collapse to a generic message; other variants keep
    /// their description.
    pub fn public_message(&self) -> String {
        match self {
            Self::Encoding(_) => format!("{}: must be UTF-8 encoded", PARSE_FAILURE_MESSAGE),
            Self::Parse(_) => PARSE_FAILURE_MESSAGE.to_string(),
            Self::NotFound(what) => what.clone(),
            Self::Transport(message) => message.clone(),
            Self::Storage(_) => "Transcript could not be saved".to_string(),
        }
    }

    /// Whether the failure happened before anything was written
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Encoding(_) | Self::Parse(_))
    }
}

impl From<AssetError> for ImportError {
    fn from(error: AssetError) -> Self {
        match error {
            AssetError::NotAssigned => Self::NotFound(error.to_string()),
            AssetError::NotFound(_) => Self::NotFound(error.to_string()),
            AssetError::Transport(message) => Self::Transport(message),
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested entity absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Error from a transcript import
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
