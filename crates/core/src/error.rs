//! Error model shared across crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used for value construction and form validation.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Raised while building values from user input (form fields, readings).
/// Failures talking to the inference service are [`ErrorKind`]s instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. pH outside 0–14).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A required field was left empty.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

/// Failure kinds surfaced by an inference request.
///
/// Every failure reaching a task's `Failed` state is one of these; the detailed
/// error stays in the logs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transport-level failure reaching the inference service.
    #[error("network failure")]
    NetworkFailure,

    /// Response received but not parseable into the expected shape, or failing
    /// field-level validation.
    #[error("malformed response")]
    MalformedResponse,

    /// Required API key absent at call time.
    #[error("missing credentials")]
    MissingCredentials,

    /// No response within the configured bound.
    #[error("timeout")]
    Timeout,
}

impl ErrorKind {
    /// Message shown inline next to the retry affordance.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::NetworkFailure => "Unable to reach the analysis service. Please check your connection.",
            ErrorKind::MalformedResponse => "The analysis came back incomplete. Please try again.",
            ErrorKind::MissingCredentials => "The assistant is not configured (API key missing).",
            ErrorKind::Timeout => "The analysis is taking too long. Please try again.",
        }
    }
}
