//! hookvault transfer client
//!
//! Uploads files as chunked message attachments, lists the logical files
//! found in the channel, reassembles them, and deletes them. Works over any
//! [`MessageStore`]; [`DiscordStore`](hookvault_discord::DiscordStore) is the
//! real backend and [`MemoryStore`] an in-process one.
//!
//! # Quick Start
//!
//! ```no_run
//! use hookvault_client::VaultClient;
//! use hookvault_discord::{DiscordConfig, DiscordStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = DiscordStore::new(DiscordConfig::new(
//!     "https://discord.com/api/webhooks/123/abc",
//! ))?;
//! let client = VaultClient::new(store);
//!
//! let report = client.upload_path("report.pdf".as_ref(), None).await?;
//! for file in client.list_files().await? {
//!     println!("{} {}", file.file_id, file.file_name);
//! }
//! let file = client.download(&report.file_id).await?;
//! client.delete(&report.file_id).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Every operation rescans the channel; nothing is cached between calls.

mod delete;
mod download;
mod error;
pub mod memory;
pub mod progress;
mod upload;

pub use delete::DeleteReport;
pub use download::DownloadedFile;
pub use error::TransferError;
pub use memory::{ListingOrder, MemoryStore};
pub use progress::{Progress, ProgressFn, Stage};
pub use upload::UploadReport;

pub use hookvault_core::{DEFAULT_CHUNK_SIZE, FileId, FileSummary, MessageStore};

use std::fmt;

use hookvault_core::{FileIndex, StoredMessage};
use tracing::{debug, instrument};

/// Transfer client over a [`MessageStore`].
pub struct VaultClient<S> {
    store: S,
    chunk_size: usize,
    progress: Option<ProgressFn>,
}

impl<S> fmt::Debug for VaultClient<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultClient")
            .field("chunk_size", &self.chunk_size)
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: MessageStore> VaultClient<S> {
    /// Create a client with the default 8 MiB chunk size.
    pub fn new(store: S) -> Self {
        Self {
            store,
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress: None,
        }
    }

    /// Set the maximum chunk size in bytes. Zero is treated as one.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Receive a [`Progress`] event after every chunk.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Maximum chunk size in bytes.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn report(&self, stage: Stage, completed: usize, total: usize) {
        if let Some(progress) = &self.progress {
            progress(Progress {
                stage,
                completed,
                total,
            });
        }
    }

    async fn scan(&self) -> Result<Vec<StoredMessage>, TransferError> {
        let messages = self.store.list_messages().await?;
        debug!(store = self.store.name(), count = messages.len(), "scanned messages");
        Ok(messages)
    }

    /// List the logical files found in the channel, sorted by name.
    ///
    /// Messages that are not chunks are skipped. Incomplete files are listed
    /// with `complete: false`.
    #[instrument(skip(self))]
    pub async fn list_files(&self) -> Result<Vec<FileSummary>, TransferError> {
        let messages = self.scan().await?;
        let index = FileIndex::build(&messages);
        debug!(
            files = index.len(),
            skipped = index.skipped(),
            "built file index"
        );
        Ok(index.summaries())
    }
}

#[cfg(test)]
mod tests {
    use hookvault_core::{ChunkMetadata, StoredAttachment};

    use super::*;

    #[tokio::test]
    async fn empty_channel_lists_nothing() {
        let client = VaultClient::new(MemoryStore::new());
        assert!(client.list_files().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn garbage_messages_do_not_break_listing() {
        let store = MemoryStore::new();
        store.push_message("good morning", vec![]);
        store.push_message(
            "{not json",
            vec![StoredAttachment {
                url: "memory://x".into(),
                filename: "x".into(),
                size: None,
            }],
        );
        store.push_message(r#"{"fileId":"only-id"}"#, vec![]);
        let meta = ChunkMetadata {
            file_id: FileId::from("f1"),
            file_name: "real.txt".into(),
            chunk_index: 0,
            total_chunks: 1,
            file_type: "text/plain".into(),
            file_size: 3,
        };
        store.push_message(
            &meta.to_content().unwrap(),
            vec![StoredAttachment {
                url: "memory://y".into(),
                filename: "real.txt.part0".into(),
                size: Some(3),
            }],
        );

        let files = VaultClient::new(store).list_files().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "real.txt");
        assert!(files[0].complete);
    }

    #[test]
    fn chunk_size_is_clamped() {
        let client = VaultClient::new(MemoryStore::new()).with_chunk_size(0);
        assert_eq!(client.chunk_size(), 1);
    }
}
