use hookvault_core::{StoredAttachment, StoredMessage};
use serde::{Deserialize, Serialize};

/// JSON part (`payload_json`) of a webhook execution carrying a chunk.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookExecuteRequest {
    /// Message text: the serialized chunk metadata.
    pub content: String,

    /// Override the webhook's default username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Webhook object returned by `GET <webhook url>`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookInfo {
    /// Webhook id.
    pub id: Option<String>,
    /// Channel the webhook posts into.
    pub channel_id: String,
    /// Guild the channel belongs to.
    pub guild_id: Option<String>,
    /// Display name of the webhook.
    pub name: Option<String>,
}

/// A message from the channel message endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordMessage {
    /// Message id.
    pub id: String,
    /// Text content. Missing for some system messages.
    #[serde(default)]
    pub content: Option<String>,
    /// Attached files.
    #[serde(default)]
    pub attachments: Vec<DiscordAttachment>,
}

/// A file attached to a Discord message.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordAttachment {
    /// Attachment id.
    pub id: Option<String>,
    /// Filename as uploaded.
    pub filename: String,
    /// Size in bytes.
    pub size: Option<u64>,
    /// CDN URL of the file.
    pub url: String,
    /// MIME type reported by Discord.
    pub content_type: Option<String>,
}

impl From<DiscordMessage> for StoredMessage {
    fn from(msg: DiscordMessage) -> Self {
        Self {
            id: msg.id,
            content: msg.content.unwrap_or_default(),
            attachments: msg
                .attachments
                .into_iter()
                .map(|a| StoredAttachment {
                    url: a.url,
                    filename: a.filename,
                    size: a.size,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_request_serializes_content_only() {
        let req = WebhookExecuteRequest {
            content: r#"{"fileId":"a"}"#.into(),
            username: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["content"], r#"{"fileId":"a"}"#);
        assert!(json.get("username").is_none());
    }

    #[test]
    fn webhook_info_deserializes() {
        let json = r#"{"type":1,"id":"123","name":"vault","channel_id":"67890","guild_id":"1","token":"t"}"#;
        let info: WebhookInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.channel_id, "67890");
        assert_eq!(info.name.as_deref(), Some("vault"));
    }

    #[test]
    fn message_converts_to_stored() {
        let json = r#"{
            "id": "111",
            "content": "hello",
            "attachments": [{
                "id": "9",
                "filename": "a.bin.part0",
                "size": 4,
                "url": "https://cdn.discordapp.com/attachments/1/9/a.bin.part0",
                "content_type": "application/octet-stream"
            }]
        }"#;
        let msg: DiscordMessage = serde_json::from_str(json).unwrap();
        let stored = StoredMessage::from(msg);
        assert_eq!(stored.id, "111");
        assert_eq!(stored.content, "hello");
        assert_eq!(stored.attachments.len(), 1);
        assert_eq!(stored.attachments[0].filename, "a.bin.part0");
        assert_eq!(stored.attachments[0].size, Some(4));
    }

    #[test]
    fn message_without_content_or_attachments() {
        let msg: DiscordMessage = serde_json::from_str(r#"{"id":"5","content":null}"#).unwrap();
        let stored = StoredMessage::from(msg);
        assert_eq!(stored.content, "");
        assert!(stored.attachments.is_empty());
    }
}
