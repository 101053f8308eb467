//! Discord message store for hookvault.
//!
//! Implements [`MessageStore`](hookvault_core::MessageStore) on top of a
//! [Discord webhook](https://discord.com/developers/docs/resources/webhook):
//! chunks are posted through the webhook as attachments, and the webhook's
//! channel is listed and pruned through the channel REST endpoints.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use hookvault_discord::{DiscordConfig, DiscordStore};
//!
//! let config = DiscordConfig::new("https://discord.com/api/webhooks/123/abc")
//!     .with_bot_token("bot-token");
//! let store = DiscordStore::new(config)?;
//! # Ok::<(), hookvault_discord::DiscordError>(())
//! ```

pub mod config;
pub mod error;
pub mod retry;
pub mod store;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::{DEFAULT_API_BASE, DiscordConfig, MAX_MESSAGE_LIMIT};
pub use error::DiscordError;
pub use retry::RetryPolicy;
pub use store::DiscordStore;
pub use types::{DiscordAttachment, DiscordMessage, WebhookInfo};
