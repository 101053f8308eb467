use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A message as returned by a [`MessageStore`](crate::MessageStore) listing,
/// reduced to the fields the index builder needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Store-assigned message id, used for deletion.
    pub id: String,
    /// Text body of the message. Chunk messages carry [`ChunkMetadata`](crate::ChunkMetadata) JSON here.
    #[serde(default)]
    pub content: String,
    /// Files attached to the message.
    #[serde(default)]
    pub attachments: Vec<StoredAttachment>,
}

/// A file hosted alongside a [`StoredMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAttachment {
    /// URL the attachment body can be fetched from.
    pub url: String,
    /// Filename the attachment was uploaded with.
    pub filename: String,
    /// Size in bytes, when the store reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// One chunk ready to be posted to a store.
#[derive(Debug, Clone)]
pub struct ChunkUpload {
    /// Attachment filename, `<original>.part<N>`.
    pub file_name: String,
    /// Raw chunk bytes.
    pub data: Bytes,
    /// Message body: the serialized chunk metadata.
    pub content: String,
}
