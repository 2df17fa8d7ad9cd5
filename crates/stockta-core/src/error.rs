//! Error types for the analysis pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Top-level pipeline error.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Classification of a single upstream failure, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network error, timeout or non-success HTTP status
    Transport,
    /// Upstream answered with zero rows
    EmptyResult,
    /// Upstream answered with fields that cannot be mapped to OHLCV
    MalformedSchema,
    /// Local file could not be read
    Io,
    /// Anything else
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Transport => "transport",
            FailureKind::EmptyResult => "empty_result",
            FailureKind::MalformedSchema => "malformed_schema",
            FailureKind::Io => "io",
            FailureKind::Other => "other",
        };
        f.write_str(s)
    }
}

/// One failed source attempt inside a fallback chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAttempt {
    /// Source name
    pub source: String,
    /// Failure class
    pub kind: FailureKind,
    /// Diagnostic message
    pub message: String,
}

/// Data source errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Empty result from {0}")]
    EmptyResult(String),

    #[error("Malformed schema: {0}")]
    MalformedSchema(String),

    #[error("No data available for {ticker} ({} source(s) tried)", .attempts.len())]
    NotAvailable {
        ticker: String,
        attempts: Vec<SourceAttempt>,
    },

    #[error("Invalid ticker: {0:?}")]
    InvalidTicker(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl DataError {
    /// Failure class for logging.
    pub fn kind(&self) -> FailureKind {
        match self {
            DataError::Transport(_) => FailureKind::Transport,
            DataError::EmptyResult(_) => FailureKind::EmptyResult,
            DataError::MalformedSchema(_) | DataError::Parse(_) => FailureKind::MalformedSchema,
            DataError::Io(_) => FailureKind::Io,
            DataError::NotAvailable { .. } | DataError::InvalidTicker(_) => FailureKind::Other,
        }
    }

    /// Whether this is the terminal "nothing could be fetched" outcome.
    pub fn is_not_available(&self) -> bool {
        matches!(self, DataError::NotAvailable { .. })
    }
}

/// Signal scoring errors.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kinds() {
        assert_eq!(
            DataError::Transport("timeout".into()).kind(),
            FailureKind::Transport
        );
        assert_eq!(
            DataError::EmptyResult("vci".into()).kind(),
            FailureKind::EmptyResult
        );
        assert_eq!(
            DataError::Parse("bad csv".into()).kind(),
            FailureKind::MalformedSchema
        );
        assert_eq!(
            DataError::Io("permission denied".into()).kind(),
            FailureKind::Io
        );
        assert_eq!(FailureKind::EmptyResult.to_string(), "empty_result");
    }

    #[test]
    fn test_not_available_message() {
        let err = DataError::NotAvailable {
            ticker: "XYZ.VN".into(),
            attempts: vec![SourceAttempt {
                source: "vci".into(),
                kind: FailureKind::EmptyResult,
                message: "no rows".into(),
            }],
        };
        assert!(err.is_not_available());
        assert_eq!(err.to_string(), "No data available for XYZ.VN (1 source(s) tried)");
    }
}
