use hookvault_core::{FileId, MessageStore, tagged_messages};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::progress::Stage;
use crate::{TransferError, VaultClient};

/// Result of a completed delete.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteReport {
    pub file_id: FileId,
    /// Number of messages removed.
    pub deleted: usize,
}

impl<S: MessageStore> VaultClient<S> {
    /// Delete every message carrying a chunk of the given file.
    ///
    /// Matching is done on the metadata alone, so duplicate chunks and chunks
    /// whose attachment is gone are removed too. Deletes run one at a time in
    /// chunk order and stop at the first failure.
    #[instrument(skip(self), fields(file_id = %file_id))]
    pub async fn delete(&self, file_id: &FileId) -> Result<DeleteReport, TransferError> {
        let messages = self.scan().await?;
        let targets = tagged_messages(&messages, file_id);
        if targets.is_empty() {
            return Err(TransferError::NotFound(file_id.clone()));
        }

        let total = targets.len();
        self.report(Stage::Delete, 0, total);

        for (deleted, target) in targets.iter().enumerate() {
            if let Err(source) = self.store.delete_message(&target.message_id).await {
                warn!(
                    message_id = %target.message_id,
                    chunk_index = target.chunk_index,
                    deleted,
                    total,
                    error = %source,
                    "delete failed, stopping"
                );
                return Err(TransferError::PartialDelete {
                    file_id: file_id.clone(),
                    deleted,
                    total,
                    source,
                });
            }
            self.report(Stage::Delete, deleted + 1, total);
        }

        info!(deleted = total, "delete complete");
        Ok(DeleteReport {
            file_id: file_id.clone(),
            deleted: total,
        })
    }
}
