use std::time::Duration;

use agrointel_core::ErrorKind;
use thiserror::Error;

/// Detailed failure of one inference call.
///
/// Views only ever see the coarse [`ErrorKind`] (via [`InferenceError::kind`]);
/// the detail is for logs.
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("inference API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("inference API key is not configured")]
    MissingCredentials,

    #[error("no response after {0:?}")]
    Timeout(Duration),
}

impl InferenceError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            InferenceError::Network(_) | InferenceError::Api { .. } => ErrorKind::NetworkFailure,
            InferenceError::Malformed(_) => ErrorKind::MalformedResponse,
            InferenceError::MissingCredentials => ErrorKind::MissingCredentials,
            InferenceError::Timeout(_) => ErrorKind::Timeout,
        }
    }
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not report the configured bound; callers with a
            // bound of their own wrap the call in `tokio::time::timeout`.
            InferenceError::Timeout(Duration::ZERO)
        } else if err.is_decode() {
            InferenceError::Malformed(err.to_string())
        } else {
            InferenceError::Network(err.to_string())
        }
    }
}
