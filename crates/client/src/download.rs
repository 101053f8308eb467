use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::{Bytes, BytesMut};
use futures::future::try_join_all;
use hookvault_core::{FileId, FileIndex, MessageStore};
use tracing::{debug, info, instrument};

use crate::progress::Stage;
use crate::{TransferError, VaultClient};

/// A reassembled file.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub file_id: FileId,
    /// Original file name.
    pub file_name: String,
    /// Original MIME type. May be empty.
    pub file_type: String,
    /// File contents.
    pub data: Bytes,
}

impl<S: MessageStore> VaultClient<S> {
    /// Reassemble the file with the given id.
    ///
    /// Chunk bodies are fetched concurrently and concatenated in chunk index
    /// order. Nothing is returned unless every chunk was found and fetched
    /// and the total matches the declared size.
    #[instrument(skip(self), fields(file_id = %file_id))]
    pub async fn download(&self, file_id: &FileId) -> Result<DownloadedFile, TransferError> {
        let messages = self.scan().await?;
        let file = FileIndex::build_for(&messages, file_id)
            .take(file_id)
            .ok_or_else(|| TransferError::NotFound(file_id.clone()))?;

        let Some(chunks) = file.ordered_chunks() else {
            return Err(TransferError::Incomplete {
                file_id: file_id.clone(),
                missing: file.missing_chunks(),
            });
        };

        let total = chunks.len();
        let done = AtomicUsize::new(0);
        self.report(Stage::Download, 0, total);

        let bodies = try_join_all(chunks.iter().map(|chunk| {
            let done = &done;
            async move {
                let body = self.store.fetch_attachment(&chunk.download_url).await?;
                debug!(chunk_index = chunk.chunk_index, bytes = body.len(), "chunk fetched");
                let completed = done.fetch_add(1, Ordering::Relaxed) + 1;
                self.report(Stage::Download, completed, total);
                Ok::<_, TransferError>(body)
            }
        }))
        .await?;

        let actual: usize = bodies.iter().map(Bytes::len).sum();
        if actual as u64 != file.file_size {
            return Err(TransferError::SizeMismatch {
                file_id: file_id.clone(),
                expected: file.file_size,
                actual: actual as u64,
            });
        }

        let mut data = BytesMut::with_capacity(actual);
        for body in &bodies {
            data.extend_from_slice(body);
        }

        info!(file_name = %file.file_name, bytes = actual, chunks = total, "download complete");
        Ok(DownloadedFile {
            file_id: file.file_id.clone(),
            file_name: file.file_name.clone(),
            file_type: file.file_type.clone(),
            data: data.freeze(),
        })
    }
}
