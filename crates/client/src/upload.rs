use std::path::Path;

use bytes::Bytes;
use hookvault_core::{
    ChunkMetadata, ChunkPlan, ChunkUpload, FileId, MAX_TOTAL_CHUNKS, MessageStore, part_file_name,
};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{info, instrument, warn};

use crate::progress::Stage;
use crate::{TransferError, VaultClient};

/// MIME type used when none is given and none can be guessed.
const FALLBACK_MIME: &str = "application/octet-stream";

/// Result of a completed upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    /// Id shared by every chunk of the file.
    pub file_id: FileId,
    /// Original file name.
    pub file_name: String,
    /// MIME type recorded in the chunk metadata.
    pub file_type: String,
    /// Size in bytes.
    pub file_size: u64,
    /// Number of chunks posted.
    pub total_chunks: usize,
    /// Ids of the created messages, in chunk order, where the store reported them.
    pub message_ids: Vec<Option<String>>,
}

impl<S: MessageStore> VaultClient<S> {
    /// Upload a file from disk.
    ///
    /// The MIME type is `file_type` when given, otherwise guessed from the
    /// extension.
    pub async fn upload_path(
        &self,
        path: &Path,
        file_type: Option<&str>,
    ) -> Result<UploadReport, TransferError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                TransferError::InvalidSource(format!("{} has no file name", path.display()))
            })?;

        let file = tokio::fs::File::open(path).await?;
        let meta = file.metadata().await?;
        if !meta.is_file() {
            return Err(TransferError::InvalidSource(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        let file_type = file_type.map_or_else(
            || {
                mime_guess::from_path(path)
                    .first_raw()
                    .unwrap_or(FALLBACK_MIME)
                    .to_owned()
            },
            str::to_owned,
        );

        self.upload(&file_name, &file_type, meta.len(), file).await
    }

    /// Upload `file_size` bytes read from `reader`.
    ///
    /// Chunks are posted one at a time in index order. The first failure
    /// aborts the upload; chunks already posted stay in the channel.
    #[instrument(skip(self, reader), fields(file_id))]
    pub async fn upload<R>(
        &self,
        file_name: &str,
        file_type: &str,
        file_size: u64,
        mut reader: R,
    ) -> Result<UploadReport, TransferError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let file_id = FileId::generate();
        tracing::Span::current().record("file_id", file_id.as_str());

        let plan = ChunkPlan::new(file_size, self.chunk_size);
        let total = plan.total_chunks();
        if total > MAX_TOTAL_CHUNKS {
            return Err(TransferError::InvalidSource(format!(
                "{file_name} needs {total} chunks of {} bytes, more than the {MAX_TOTAL_CHUNKS} allowed",
                self.chunk_size
            )));
        }
        let mut message_ids = Vec::with_capacity(total);
        self.report(Stage::Upload, 0, total);

        for chunk_index in 0..total {
            let len = plan.chunk_len(chunk_index).unwrap_or_default();
            let mut buf = vec![0u8; len];
            if let Err(e) = reader.read_exact(&mut buf).await {
                warn!(chunk_index, total, error = %e, "source ended before the declared size");
                return Err(e.into());
            }

            let metadata = ChunkMetadata {
                file_id: file_id.clone(),
                file_name: file_name.to_owned(),
                chunk_index,
                total_chunks: total,
                file_type: file_type.to_owned(),
                file_size,
            };
            let upload = ChunkUpload {
                file_name: part_file_name(file_name, chunk_index),
                data: Bytes::from(buf),
                content: metadata.to_content()?,
            };

            match self.store.post_chunk(upload).await {
                Ok(id) => message_ids.push(id),
                Err(source) => {
                    warn!(chunk_index, total, error = %source, "chunk upload failed, aborting");
                    return Err(TransferError::UploadAborted {
                        file_name: file_name.to_owned(),
                        file_id,
                        uploaded: chunk_index,
                        total,
                        source,
                    });
                }
            }
            self.report(Stage::Upload, chunk_index + 1, total);
        }

        info!(file_name, file_size, total_chunks = total, "upload complete");
        Ok(UploadReport {
            file_id,
            file_name: file_name.to_owned(),
            file_type: file_type.to_owned(),
            file_size,
            total_chunks: total,
            message_ids,
        })
    }
}
