use bytes::Bytes;
use hookvault_core::{ChunkUpload, MessageStore, StoreError, StoredMessage};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::config::DiscordConfig;
use crate::error::DiscordError;
use crate::types::{DiscordMessage, WebhookExecuteRequest, WebhookInfo};

/// [`MessageStore`] backed by a Discord webhook and its channel.
///
/// Chunks are posted through the webhook. Listing and deleting go through
/// the channel REST endpoints; the channel id is resolved from the webhook
/// object on first use and cached for the lifetime of the store.
pub struct DiscordStore {
    config: DiscordConfig,
    client: Client,
    channel_id: OnceCell<String>,
}

impl DiscordStore {
    /// Create a new Discord store with the given configuration.
    pub fn new(config: DiscordConfig) -> Result<Self, DiscordError> {
        if config.webhook_url.is_empty() {
            return Err(DiscordError::Configuration(
                "webhook URL must not be empty".into(),
            ));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(DiscordError::Http)?;
        Ok(Self::with_client(config, client))
    }

    /// Create a new Discord store with a custom HTTP client.
    pub fn with_client(config: DiscordConfig, client: Client) -> Self {
        Self {
            config,
            client,
            channel_id: OnceCell::new(),
        }
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> &DiscordConfig {
        &self.config
    }

    /// Fetch the webhook object, which names the channel it posts into.
    #[instrument(skip(self), fields(store = "discord"))]
    pub async fn webhook_info(&self) -> Result<WebhookInfo, DiscordError> {
        let response = self
            .config
            .retry
            .send(|| Ok(self.client.get(&self.config.webhook_url)))
            .await?;
        let response = Self::check(response).await?;
        response
            .json::<WebhookInfo>()
            .await
            .map_err(|e| DiscordError::Decode(format!("invalid webhook object: {e}")))
    }

    async fn channel_id(&self) -> Result<&str, DiscordError> {
        let id = self
            .channel_id
            .get_or_try_init(|| async {
                let info = self.webhook_info().await?;
                debug!(channel_id = %info.channel_id, "resolved webhook channel");
                Ok::<_, DiscordError>(info.channel_id)
            })
            .await?;
        Ok(id.as_str())
    }

    /// URL of the channel message collection.
    fn messages_url(&self, channel_id: &str) -> String {
        format!("{}/channels/{channel_id}/messages", self.config.api_base)
    }

    /// Webhook execution URL with `wait=true` so Discord returns the created
    /// message.
    fn execute_url(&self) -> String {
        if self.config.webhook_url.contains('?') {
            format!("{}&wait=true", self.config.webhook_url)
        } else {
            format!("{}?wait=true", self.config.webhook_url)
        }
    }

    /// Add the bot authorization header if a token is configured.
    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.config.bot_token {
            Some(token) => req.header("Authorization", format!("Bot {token}")),
            None => req,
        }
    }

    /// Turn a non-success status into an error, keeping the body.
    async fn check(response: Response) -> Result<Response, DiscordError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(DiscordError::Api {
            status: status.as_u16(),
            body,
        })
    }

    fn chunk_form(&self, upload: &ChunkUpload, payload_json: &str) -> Result<Form, DiscordError> {
        let part = Part::stream_with_length(upload.data.clone(), upload.data.len() as u64)
            .file_name(upload.file_name.clone())
            .mime_str("application/octet-stream")?;
        Ok(Form::new()
            .part("file", part)
            .text("payload_json", payload_json.to_owned()))
    }

    async fn list(&self) -> Result<Vec<StoredMessage>, DiscordError> {
        let url = self.messages_url(self.channel_id().await?);
        let limit = self.config.message_limit.to_string();
        let response = self
            .config
            .retry
            .send(|| {
                Ok(self.authorize(
                    self.client
                        .get(&url)
                        .query(&[("limit", limit.as_str())]),
                ))
            })
            .await?;
        let messages: Vec<DiscordMessage> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| DiscordError::Decode(format!("invalid message list: {e}")))?;
        debug!(count = messages.len(), "listed channel messages");
        Ok(messages.into_iter().map(StoredMessage::from).collect())
    }

    async fn post(&self, upload: ChunkUpload) -> Result<Option<String>, DiscordError> {
        let payload_json = serde_json::to_string(&WebhookExecuteRequest {
            content: upload.content.clone(),
            username: self.config.username.clone(),
        })
        .map_err(|e| DiscordError::InvalidPayload(format!("failed to serialize request: {e}")))?;
        let url = self.execute_url();

        let response = self
            .config
            .retry
            .send(|| {
                let form = self.chunk_form(&upload, &payload_json)?;
                Ok(self.client.post(&url).multipart(form))
            })
            .await?;
        let response = Self::check(response).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        match response.json::<DiscordMessage>().await {
            Ok(message) => {
                info!(message_id = %message.id, file_name = %upload.file_name, "chunk posted");
                Ok(Some(message.id))
            }
            Err(e) => {
                debug!(error = %e, "chunk posted but response body was not a message");
                Ok(None)
            }
        }
    }

    async fn delete(&self, message_id: &str) -> Result<(), DiscordError> {
        let url = format!(
            "{}/{message_id}",
            self.messages_url(self.channel_id().await?)
        );
        let response = self
            .config
            .retry
            .send(|| Ok(self.authorize(self.client.delete(&url))))
            .await?;
        Self::check(response).await?;
        debug!(message_id, "message deleted");
        Ok(())
    }

    async fn fetch(&self, url: &str) -> Result<Bytes, DiscordError> {
        let response = self.config.retry.send(|| Ok(self.client.get(url))).await?;
        Ok(Self::check(response).await?.bytes().await?)
    }
}

impl MessageStore for DiscordStore {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "discord"
    }

    #[instrument(skip(self), fields(store = "discord"))]
    async fn list_messages(&self) -> Result<Vec<StoredMessage>, StoreError> {
        Ok(self.list().await?)
    }

    #[instrument(skip(self, upload), fields(store = "discord", file_name = %upload.file_name, bytes = upload.data.len()))]
    async fn post_chunk(&self, upload: ChunkUpload) -> Result<Option<String>, StoreError> {
        Ok(self.post(upload).await?)
    }

    #[instrument(skip(self), fields(store = "discord"))]
    async fn delete_message(&self, message_id: &str) -> Result<(), StoreError> {
        Ok(self.delete(message_id).await?)
    }

    #[instrument(skip(self), fields(store = "discord"))]
    async fn fetch_attachment(&self, url: &str) -> Result<Bytes, StoreError> {
        Ok(self.fetch(url).await?)
    }
}
