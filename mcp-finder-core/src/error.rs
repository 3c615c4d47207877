//! Error types for lookups, searches and joins.

use thiserror::Error;

use crate::join::JoinError;

pub type Result<T> = std::result::Result<T, FinderError>;

#[derive(Debug, Error)]
pub enum FinderError {
    /// The platform answered but carried no matching record.
    #[error("{0} not found")]
    NotFound(String),

    /// Transport-level failure (connect, timeout, body read).
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// The platform answered with a non-success status.
    #[error("platform returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("a logged-in session cookie is required for {0}")]
    MissingCredentials(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The action is already running; the panel button is disabled.
    #[error("{0} is already in progress")]
    Busy(&'static str),

    #[error(transparent)]
    Join(#[from] JoinError),
}

impl FinderError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// True for errors caused by the caller rather than the platform.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Busy(_))
    }
}

impl From<FinderError> for pmcp::Error {
    fn from(err: FinderError) -> Self {
        if err.is_caller_error() {
            pmcp::Error::validation(err.to_string())
        } else {
            pmcp::Error::internal(err.to_string())
        }
    }
}
