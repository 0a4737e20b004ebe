//! Error types for ledger client operations
//!
//! One taxonomy for every component: local precondition and validation
//! failures (no call issued), transport failures, non-2xx service answers,
//! and the two specialisations that tell the submitter which step of the
//! sign-then-submit protocol failed.

use thiserror::Error;

/// Core error type for ledger client operations
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ClientError {
    /// A required piece of session state or input is missing; no call was made
    #[error("{0}")]
    Precondition(String),

    /// User input is malformed; no call was made
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The ledger could not be reached or did not answer
    #[error("Network error: {0}")]
    Network(String),

    /// The ledger answered with a non-2xx status
    #[error("Ledger error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    /// The ledger answered 2xx but the body was not the expected record
    #[error("Invalid response from ledger: {0}")]
    InvalidResponse(String),

    /// The signing call failed; nothing was submitted
    #[error("Signing failed: {0}")]
    RemoteSign(#[source] Box<ClientError>),

    /// The submission call failed after a successful signing call
    #[error("Submission failed: {0}")]
    Submission(#[source] Box<ClientError>),
}

impl ClientError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Wrap a failure of the signing step
    pub fn remote_sign(cause: ClientError) -> Self {
        Self::RemoteSign(Box::new(cause))
    }

    /// Wrap a failure of the submission step
    pub fn submission(cause: ClientError) -> Self {
        Self::Submission(Box::new(cause))
    }

    /// True when the error was raised locally, before any network call
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Precondition(_) | Self::Validation(_))
    }

    /// HTTP status of the underlying service failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            Self::RemoteSign(inner) | Self::Submission(inner) => inner.status(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
