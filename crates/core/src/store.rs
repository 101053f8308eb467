use bytes::Bytes;

use crate::error::StoreError;
use crate::message::{ChunkUpload, StoredMessage};

/// A message channel that can hold chunk attachments.
///
/// Uses native `async fn` in traits, so it is not object-safe; transfer code
/// is generic over the store instead.
pub trait MessageStore: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &str;

    /// Fetch the most recent page of messages, newest first.
    fn list_messages(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<StoredMessage>, StoreError>> + Send;

    /// Post one chunk as a new message carrying a single attachment.
    ///
    /// Returns the id of the created message when the backend reports it.
    fn post_chunk(
        &self,
        upload: ChunkUpload,
    ) -> impl std::future::Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Delete the message with the given id.
    fn delete_message(
        &self,
        message_id: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Download the body of an attachment.
    fn fetch_attachment(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<Bytes, StoreError>> + Send;
}
