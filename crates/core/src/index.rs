use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::file_id::FileId;
use crate::message::StoredMessage;
use crate::metadata::{ChunkMetadata, ChunkRecord, decode_message};

/// Location of one uploaded chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkRef {
    /// Zero-based position inside the file.
    pub chunk_index: usize,
    /// URL of the hosted attachment.
    pub download_url: String,
    /// Message that owns the attachment.
    pub message_id: String,
    /// Attachment filename as stored.
    pub filename: String,
    /// Attachment size reported by the store.
    pub size: Option<u64>,
}

/// A file reconstructed from the chunks found in a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalFile {
    pub file_id: FileId,
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    /// One slot per declared chunk, `None` until that chunk has been seen.
    pub chunks: Vec<Option<ChunkRef>>,
}

impl LogicalFile {
    fn from_metadata(meta: &ChunkMetadata) -> Self {
        Self {
            file_id: meta.file_id.clone(),
            file_name: meta.file_name.clone(),
            file_type: meta.file_type.clone(),
            file_size: meta.file_size,
            chunks: vec![None; meta.total_chunks],
        }
    }

    fn matches(&self, meta: &ChunkMetadata) -> bool {
        self.file_name == meta.file_name
            && self.file_type == meta.file_type
            && self.file_size == meta.file_size
            && self.chunks.len() == meta.total_chunks
    }

    /// Declared number of chunks.
    pub fn total_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Number of chunks found.
    pub fn present_chunks(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_some()).count()
    }

    /// Whether every chunk slot is filled.
    pub fn is_complete(&self) -> bool {
        self.chunks.iter().all(Option::is_some)
    }

    /// Indices of the chunks that were not found.
    pub fn missing_chunks(&self) -> Vec<usize> {
        self.chunks
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.is_none().then_some(i))
            .collect()
    }

    /// Chunks in index order, or `None` if any chunk is missing.
    pub fn ordered_chunks(&self) -> Option<Vec<&ChunkRef>> {
        self.chunks.iter().map(Option::as_ref).collect()
    }

    /// Every chunk that was found, in index order.
    pub fn present(&self) -> impl Iterator<Item = &ChunkRef> {
        self.chunks.iter().flatten()
    }

    /// Display row for this file.
    pub fn summary(&self) -> FileSummary {
        FileSummary {
            file_id: self.file_id.clone(),
            file_name: self.file_name.clone(),
            file_type: self.file_type.clone(),
            file_size: self.file_size,
            total_chunks: self.total_chunks(),
            present_chunks: self.present_chunks(),
            complete: self.is_complete(),
        }
    }
}

/// One row of the file listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub file_id: FileId,
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    pub total_chunks: usize,
    pub present_chunks: usize,
    pub complete: bool,
}

/// A message whose body names a given file, whether or not it made it into
/// the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedMessage {
    pub message_id: String,
    pub chunk_index: usize,
}

/// Every message whose body is chunk metadata for `file_id`, ordered by chunk
/// index then message id.
///
/// Unlike [`FileIndex::build_for`] this keeps duplicates, conflicting records
/// and messages that lost their attachment, so a delete can clear them all.
pub fn tagged_messages<'a>(
    messages: impl IntoIterator<Item = &'a StoredMessage>,
    file_id: &FileId,
) -> Vec<TaggedMessage> {
    let mut tagged: Vec<TaggedMessage> = messages
        .into_iter()
        .filter_map(|m| {
            let meta = ChunkMetadata::parse(&m.content).ok()?;
            (&meta.file_id == file_id).then(|| TaggedMessage {
                message_id: m.id.clone(),
                chunk_index: meta.chunk_index,
            })
        })
        .collect();
    tagged.sort_by(|a, b| {
        a.chunk_index
            .cmp(&b.chunk_index)
            .then_with(|| a.message_id.cmp(&b.message_id))
    });
    tagged
}

/// Logical files folded out of a message listing, keyed by file id.
///
/// The index is rebuilt from scratch on every operation; it holds no state
/// that could drift from the channel.
#[derive(Debug, Default, Clone)]
pub struct FileIndex {
    files: BTreeMap<FileId, LogicalFile>,
    skipped: usize,
}

impl FileIndex {
    /// Fold every chunk message in `messages` into the index.
    pub fn build<'a>(messages: impl IntoIterator<Item = &'a StoredMessage>) -> Self {
        Self::build_filtered(messages, |_| true)
    }

    /// Fold only the chunks belonging to `file_id`.
    pub fn build_for<'a>(
        messages: impl IntoIterator<Item = &'a StoredMessage>,
        file_id: &FileId,
    ) -> Self {
        Self::build_filtered(messages, |meta| &meta.file_id == file_id)
    }

    fn build_filtered<'a>(
        messages: impl IntoIterator<Item = &'a StoredMessage>,
        keep: impl Fn(&ChunkMetadata) -> bool,
    ) -> Self {
        let mut index = Self::default();
        for message in messages {
            match decode_message(message) {
                Ok(record) if keep(&record.metadata) => index.insert(record),
                Ok(_) => {}
                Err(e) => {
                    debug!(message_id = %message.id, error = %e, "skipping message");
                    index.skipped += 1;
                }
            }
        }
        index
    }

    fn insert(&mut self, record: ChunkRecord) {
        let ChunkRecord { metadata, chunk } = record;
        let file = self
            .files
            .entry(metadata.file_id.clone())
            .or_insert_with(|| LogicalFile::from_metadata(&metadata));

        if !file.matches(&metadata) {
            warn!(
                file_id = %metadata.file_id,
                message_id = %chunk.message_id,
                "chunk metadata disagrees with earlier chunks of the same file, skipping"
            );
            self.skipped += 1;
            return;
        }

        let slot = &mut file.chunks[chunk.chunk_index];
        if let Some(existing) = slot {
            debug!(
                file_id = %metadata.file_id,
                chunk_index = chunk.chunk_index,
                kept = %existing.message_id,
                dropped = %chunk.message_id,
                "duplicate chunk, keeping the first seen"
            );
            self.skipped += 1;
            return;
        }
        *slot = Some(chunk);
    }

    /// Look up a file by id.
    pub fn get(&self, file_id: &FileId) -> Option<&LogicalFile> {
        self.files.get(file_id)
    }

    /// Remove and return a file by id.
    pub fn take(&mut self, file_id: &FileId) -> Option<LogicalFile> {
        self.files.remove(file_id)
    }

    /// Listing rows sorted by file name, then id.
    pub fn summaries(&self) -> Vec<FileSummary> {
        let mut rows: Vec<FileSummary> = self.files.values().map(LogicalFile::summary).collect();
        rows.sort_by(|a, b| {
            a.file_name
                .cmp(&b.file_name)
                .then_with(|| a.file_id.cmp(&b.file_id))
        });
        rows
    }

    /// Number of logical files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no chunks were found.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Messages that were not folded in: non-chunk messages, conflicting
    /// metadata and duplicate chunks.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
