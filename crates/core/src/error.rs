use thiserror::Error;

/// Errors surfaced by a [`MessageStore`](crate::MessageStore) implementation.
///
/// Backends keep their own richer error types internally and convert into
/// this enum at the trait boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The store answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The store kept rejecting the request with "too many requests".
    #[error("rate limited")]
    RateLimited,

    /// A response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The store was given invalid configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl StoreError {
    /// Returns `true` if the error is transient and the operation may succeed
    /// on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::RateLimited => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode(_) | Self::Configuration(_) => false,
        }
    }

    /// Returns the HTTP status code, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
