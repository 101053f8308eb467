//! Error types for hookvault transfers.

use hookvault_core::{FileId, StoreError};
use thiserror::Error;

/// Errors that can occur while uploading, listing, downloading or deleting.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The message store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No chunk of the requested file exists in the listing.
    #[error("file not found: {0}")]
    NotFound(FileId),

    /// Some chunks of the requested file are missing from the listing.
    #[error("file {file_id} is incomplete: missing chunks {missing:?}")]
    Incomplete {
        /// The requested file.
        file_id: FileId,
        /// Indices of the chunks that were not found.
        missing: Vec<usize>,
    },

    /// The reassembled file does not have the size its metadata declares.
    #[error("file {file_id} reassembled to {actual} bytes, expected {expected}")]
    SizeMismatch {
        /// The requested file.
        file_id: FileId,
        /// Size declared in the chunk metadata.
        expected: u64,
        /// Size of the concatenated chunks.
        actual: u64,
    },

    /// A chunk upload failed; the chunks already posted are left in place.
    #[error("upload of {file_name} aborted after {uploaded} of {total} chunks: {source}")]
    UploadAborted {
        /// Name of the file being uploaded.
        file_name: String,
        /// Id shared by the chunks already posted.
        file_id: FileId,
        /// Chunks acknowledged before the failure.
        uploaded: usize,
        /// Chunks the file was split into.
        total: usize,
        /// The store error that stopped the upload.
        #[source]
        source: StoreError,
    },

    /// A delete failed part-way; the messages already deleted stay deleted.
    #[error("delete of {file_id} stopped after {deleted} of {total} messages: {source}")]
    PartialDelete {
        /// The file being deleted.
        file_id: FileId,
        /// Messages deleted before the failure.
        deleted: usize,
        /// Messages that carried the file.
        total: usize,
        /// The store error that stopped the delete.
        #[source]
        source: StoreError,
    },

    /// The upload source is unusable.
    #[error("invalid source: {0}")]
    InvalidSource(String),

    /// Reading the upload source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Chunk metadata could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TransferError {
    /// The file whose chunks this failure left behind in the channel.
    ///
    /// Set when an upload aborted after posting some chunks, or a delete
    /// stopped with messages still present.
    pub fn orphaned_file(&self) -> Option<&FileId> {
        match self {
            Self::UploadAborted {
                file_id, uploaded, ..
            } if *uploaded > 0 => Some(file_id),
            Self::PartialDelete {
                file_id,
                deleted,
                total,
                ..
            } if deleted < total => Some(file_id),
            _ => None,
        }
    }
}
