use hookvault_core::StoreError;
use thiserror::Error;

/// Errors specific to the Discord store.
///
/// These are internal errors that get converted into [`StoreError`] at the
/// [`MessageStore`](hookvault_core::MessageStore) boundary.
#[derive(Debug, Error)]
pub enum DiscordError {
    /// An HTTP-level transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Discord API returned a non-success status.
    #[error("Discord API error: HTTP {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Every attempt was answered with HTTP 429 (Too Many Requests).
    #[error("rate limited by Discord")]
    RateLimited,

    /// A request body could not be built.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The store configuration is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<DiscordError> for StoreError {
    fn from(err: DiscordError) -> Self {
        match err {
            DiscordError::Http(e) => StoreError::Connection(e.to_string()),
            DiscordError::Api { status, body } => StoreError::Status { status, body },
            DiscordError::RateLimited => StoreError::RateLimited,
            DiscordError::InvalidPayload(msg) | DiscordError::Configuration(msg) => {
                StoreError::Configuration(msg)
            }
            DiscordError::Decode(msg) => StoreError::Decode(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_maps_to_retryable() {
        let store_err: StoreError = DiscordError::RateLimited.into();
        assert!(store_err.is_retryable());
        assert!(matches!(store_err, StoreError::RateLimited));
    }

    #[test]
    fn api_error_keeps_status() {
        let store_err: StoreError = DiscordError::Api {
            status: 401,
            body: "401: Unauthorized".into(),
        }
        .into();
        assert!(!store_err.is_retryable());
        assert_eq!(store_err.status(), Some(401));
    }

    #[test]
    fn decode_maps_to_decode() {
        let store_err: StoreError = DiscordError::Decode("missing channel_id".into()).into();
        assert!(matches!(store_err, StoreError::Decode(_)));
    }

    #[test]
    fn error_display() {
        let err = DiscordError::Api {
            status: 400,
            body: "bad request".into(),
        };
        assert_eq!(
            err.to_string(),
            "Discord API error: HTTP 400: bad request"
        );
    }
}
