//! Error types for seolens-core

use thiserror::Error;

/// Rejected configuration values; raised when the value is set or loaded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("failed to read configuration file {path}: {reason}")]
    Io { path: String, reason: String },
}

/// The HTML could not be turned into a workable tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("document is empty")]
    Empty,

    #[error("input contains no HTML markup")]
    NoMarkup,
}

/// Failures of the external content-improvement capability
#[derive(Error, Debug)]
pub enum ImproverError {
    #[error("content improver is disabled")]
    Disabled,

    #[error("content improver timed out after {0}s")]
    Timeout(u64),

    #[error("missing API key: environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("provider request failed: {0}")]
    Request(String),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider returned no content")]
    EmptyResponse,
}

/// Session registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session {0} already exists")]
    AlreadyExists(String),
}

/// A progress sink failed to deliver a notification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("progress sink {sink} failed: {reason}")]
pub struct SinkError {
    pub sink: String,
    pub reason: String,
}

impl SinkError {
    pub fn new(sink: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            reason: reason.into(),
        }
    }
}

/// Outcomes of `start_optimization` that are surfaced to the caller as errors.
///
/// Analyzer, fixer and improver failures are recovered inside the loop and
/// never appear here.
#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),
}
