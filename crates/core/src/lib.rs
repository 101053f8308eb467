//! Core types for hookvault.
//!
//! hookvault stores files inside a chat channel: every file is split into
//! chunks, each chunk is posted as one message attachment, and the message
//! body carries a small JSON document describing where the chunk belongs.
//! The channel history is the only index.
//!
//! This crate holds everything that does not perform I/O: the wire metadata,
//! chunk planning, the index builder that folds a message listing back into
//! logical files, and the [`MessageStore`] trait that storage backends
//! implement.

pub mod chunking;
pub mod error;
pub mod file_id;
pub mod index;
pub mod message;
pub mod metadata;
pub mod size;
pub mod store;

pub use chunking::{ChunkPlan, DEFAULT_CHUNK_SIZE, MAX_TOTAL_CHUNKS, part_file_name};
pub use error::StoreError;
pub use file_id::FileId;
pub use index::{ChunkRef, FileIndex, FileSummary, LogicalFile, TaggedMessage, tagged_messages};
pub use message::{ChunkUpload, StoredAttachment, StoredMessage};
pub use metadata::{ChunkMetadata, ChunkRecord, DecodeError, decode_message};
pub use size::format_size;
pub use store::MessageStore;
