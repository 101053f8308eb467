use std::time::Duration;

use crate::retry::RetryPolicy;

/// Discord REST API base used for channel endpoints.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v9";

/// Largest page the channel message endpoint returns.
pub const MAX_MESSAGE_LIMIT: u8 = 100;

/// Configuration for the Discord message store.
#[derive(Clone)]
pub struct DiscordConfig {
    /// Discord webhook URL. Chunks are posted here and the channel is
    /// resolved from it.
    pub webhook_url: String,

    /// Base URL for channel endpoints (list and delete).
    pub api_base: String,

    /// Bot token sent as `Authorization: Bot <token>` on channel endpoints.
    pub bot_token: Option<String>,

    /// Username override for posted chunk messages.
    pub username: Option<String>,

    /// Page size for message listings, clamped to `1..=100`.
    pub message_limit: u8,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Rate-limit retry behaviour.
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("webhook_url", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "[REDACTED]"))
            .field("username", &self.username)
            .field("message_limit", &self.message_limit)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl DiscordConfig {
    /// Create a new configuration with the given webhook URL.
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into().trim().to_owned(),
            api_base: DEFAULT_API_BASE.to_owned(),
            bot_token: None,
            username: None,
            message_limit: MAX_MESSAGE_LIMIT,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    /// Override the REST API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_owned();
        self
    }

    /// Set the bot token used for channel endpoints.
    #[must_use]
    pub fn with_bot_token(mut self, token: impl Into<String>) -> Self {
        self.bot_token = Some(token.into());
        self
    }

    /// Set the username shown on posted messages.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the listing page size.
    #[must_use]
    pub fn with_message_limit(mut self, limit: u8) -> Self {
        self.message_limit = limit.clamp(1, MAX_MESSAGE_LIMIT);
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
