use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chunking::MAX_TOTAL_CHUNKS;
use crate::file_id::FileId;
use crate::index::ChunkRef;
use crate::message::StoredMessage;

/// Description of one chunk, stored as the JSON body of its message.
///
/// This is the only durable record tying chunks together, so the key names
/// are fixed: `fileId`, `fileName`, `chunkIndex`, `totalChunks`, `fileType`,
/// `fileSize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    /// Id shared by every chunk of the file.
    pub file_id: FileId,
    /// Original file name.
    pub file_name: String,
    /// Zero-based position of this chunk.
    pub chunk_index: usize,
    /// Number of chunks the file was split into.
    pub total_chunks: usize,
    /// MIME type of the original file. May be empty.
    #[serde(default)]
    pub file_type: String,
    /// Size of the original file in bytes.
    pub file_size: u64,
}

impl ChunkMetadata {
    /// Serialize to the compact JSON string placed in the message body.
    pub fn to_content(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a message body as chunk metadata.
    pub fn parse(content: &str) -> Result<Self, DecodeError> {
        if content.trim().is_empty() {
            return Err(DecodeError::EmptyContent);
        }
        serde_json::from_str(content).map_err(|e| DecodeError::InvalidJson(e.to_string()))
    }
}

/// A message that decoded successfully as a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRecord {
    /// Metadata parsed from the message body.
    pub metadata: ChunkMetadata,
    /// Where the chunk bytes live.
    pub chunk: ChunkRef,
}

/// Why a message was not recognised as a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The message has no text body.
    #[error("message has no content")]
    EmptyContent,

    /// The body is not a chunk metadata document.
    #[error("content is not chunk metadata: {0}")]
    InvalidJson(String),

    /// The message carries no attachment.
    #[error("message has no attachment")]
    NoAttachment,

    /// The message carries more than one attachment.
    #[error("expected exactly one attachment, found {0}")]
    ExtraAttachments(usize),

    /// `totalChunks` is zero.
    #[error("totalChunks must be at least 1")]
    ZeroChunks,

    /// `totalChunks` is more than the file size or the per-file limit allows.
    #[error("totalChunks {total} is implausible for fileSize {file_size}")]
    TooManyChunks {
        /// Declared chunk count.
        total: usize,
        /// Declared file size.
        file_size: u64,
    },

    /// `chunkIndex` does not fit inside `totalChunks`.
    #[error("chunkIndex {index} out of range for totalChunks {total}")]
    IndexOutOfRange {
        /// Declared chunk index.
        index: usize,
        /// Declared chunk count.
        total: usize,
    },
}

/// Decode a listed message into a chunk record.
///
/// Every message in the channel passes through here, including ordinary chat
/// messages, so a failure is an expected outcome rather than an error worth
/// surfacing.
pub fn decode_message(message: &StoredMessage) -> Result<ChunkRecord, DecodeError> {
    let metadata = ChunkMetadata::parse(&message.content)?;

    let attachment = match message.attachments.as_slice() {
        [] => return Err(DecodeError::NoAttachment),
        [only] => only,
        many => return Err(DecodeError::ExtraAttachments(many.len())),
    };

    if metadata.total_chunks == 0 {
        return Err(DecodeError::ZeroChunks);
    }
    if metadata.total_chunks > max_chunks_for(metadata.file_size) {
        return Err(DecodeError::TooManyChunks {
            total: metadata.total_chunks,
            file_size: metadata.file_size,
        });
    }
    if metadata.chunk_index >= metadata.total_chunks {
        return Err(DecodeError::IndexOutOfRange {
            index: metadata.chunk_index,
            total: metadata.total_chunks,
        });
    }

    let chunk = ChunkRef {
        chunk_index: metadata.chunk_index,
        download_url: attachment.url.clone(),
        message_id: message.id.clone(),
        filename: attachment.filename.clone(),
        size: attachment.size,
    };

    Ok(ChunkRecord { metadata, chunk })
}

/// Every chunk but an empty file's only chunk holds at least one byte.
fn max_chunks_for(file_size: u64) -> usize {
    usize::try_from(file_size.max(1))
        .unwrap_or(usize::MAX)
        .min(MAX_TOTAL_CHUNKS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StoredAttachment;

    fn attachment(url: &str) -> StoredAttachment {
        StoredAttachment {
            url: url.into(),
            filename: "a.bin.part0".into(),
            size: Some(4),
        }
    }

    fn message(content: &str, attachments: Vec<StoredAttachment>) -> StoredMessage {
        StoredMessage {
            id: "m1".into(),
            content: content.into(),
            attachments,
        }
    }

    const VALID: &str = r#"{"fileId":"f1","fileName":"a.bin","chunkIndex":0,"totalChunks":2,"fileType":"application/pdf","fileSize":12}"#;

    #[test]
    fn metadata_uses_camel_case_keys() {
        let meta = ChunkMetadata {
            file_id: FileId::from("f1"),
            file_name: "a.bin".into(),
            chunk_index: 1,
            total_chunks: 3,
            file_type: "text/plain".into(),
            file_size: 20,
        };
        let json: serde_json::Value = serde_json::from_str(&meta.to_content().unwrap()).unwrap();
        assert_eq!(json["fileId"], "f1");
        assert_eq!(json["fileName"], "a.bin");
        assert_eq!(json["chunkIndex"], 1);
        assert_eq!(json["totalChunks"], 3);
        assert_eq!(json["fileType"], "text/plain");
        assert_eq!(json["fileSize"], 20);
    }

    #[test]
    fn decodes_valid_chunk() {
        let record = decode_message(&message(VALID, vec![attachment("https://cdn/x")])).unwrap();
        assert_eq!(record.metadata.file_id.as_str(), "f1");
        assert_eq!(record.metadata.total_chunks, 2);
        assert_eq!(record.chunk.chunk_index, 0);
        assert_eq!(record.chunk.download_url, "https://cdn/x");
        assert_eq!(record.chunk.message_id, "m1");
    }

    #[test]
    fn missing_file_type_defaults_to_empty() {
        let content = r#"{"fileId":"f1","fileName":"a","chunkIndex":0,"totalChunks":1,"fileSize":0}"#;
        let record = decode_message(&message(content, vec![attachment("u")])).unwrap();
        assert_eq!(record.metadata.file_type, "");
    }

    #[test]
    fn plain_text_is_invalid_json() {
        let err = decode_message(&message("hello everyone", vec![attachment("u")])).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidJson(_)));
    }

    #[test]
    fn json_of_wrong_shape_is_invalid() {
        let err = decode_message(&message(r#"{"hello":"world"}"#, vec![attachment("u")]))
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidJson(_)));

        let err = decode_message(&message("42", vec![attachment("u")])).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidJson(_)));
    }

    #[test]
    fn empty_content_rejected() {
        let err = decode_message(&message("", vec![attachment("u")])).unwrap_err();
        assert_eq!(err, DecodeError::EmptyContent);
    }

    #[test]
    fn attachment_count_must_be_one() {
        assert_eq!(
            decode_message(&message(VALID, vec![])).unwrap_err(),
            DecodeError::NoAttachment
        );
        assert_eq!(
            decode_message(&message(VALID, vec![attachment("a"), attachment("b")])).unwrap_err(),
            DecodeError::ExtraAttachments(2)
        );
    }

    #[test]
    fn index_must_fit_total() {
        let content = r#"{"fileId":"f1","fileName":"a","chunkIndex":2,"totalChunks":2,"fileType":"","fileSize":1}"#;
        assert_eq!(
            decode_message(&message(content, vec![attachment("u")])).unwrap_err(),
            DecodeError::IndexOutOfRange { index: 2, total: 2 }
        );
    }

    #[test]
    fn zero_total_rejected() {
        let content = r#"{"fileId":"f1","fileName":"a","chunkIndex":0,"totalChunks":0,"fileType":"","fileSize":0}"#;
        assert_eq!(
            decode_message(&message(content, vec![attachment("u")])).unwrap_err(),
            DecodeError::ZeroChunks
        );
    }

    #[test]
    fn total_larger_than_file_size_rejected() {
        let content = r#"{"fileId":"f1","fileName":"a","chunkIndex":0,"totalChunks":18446744073709551615,"fileType":"","fileSize":10}"#;
        assert_eq!(
            decode_message(&message(content, vec![attachment("u")])).unwrap_err(),
            DecodeError::TooManyChunks {
                total: usize::MAX,
                file_size: 10,
            }
        );

        let content = r#"{"fileId":"f1","fileName":"a","chunkIndex":0,"totalChunks":2,"fileType":"","fileSize":0}"#;
        assert!(matches!(
            decode_message(&message(content, vec![attachment("u")])).unwrap_err(),
            DecodeError::TooManyChunks { total: 2, .. }
        ));
    }

    #[test]
    fn total_above_limit_rejected_even_for_huge_files() {
        let content = format!(
            r#"{{"fileId":"f1","fileName":"a","chunkIndex":0,"totalChunks":{},"fileType":"","fileSize":1000000000000}}"#,
            MAX_TOTAL_CHUNKS + 1
        );
        assert!(matches!(
            decode_message(&message(&content, vec![attachment("u")])).unwrap_err(),
            DecodeError::TooManyChunks { .. }
        ));

        let content = format!(
            r#"{{"fileId":"f1","fileName":"a","chunkIndex":0,"totalChunks":{MAX_TOTAL_CHUNKS},"fileType":"","fileSize":1000000000000}}"#
        );
        assert!(decode_message(&message(&content, vec![attachment("u")])).is_ok());
    }

    #[test]
    fn negative_index_is_invalid_json() {
        let content = r#"{"fileId":"f1","fileName":"a","chunkIndex":-1,"totalChunks":2,"fileType":"","fileSize":1}"#;
        assert!(matches!(
            decode_message(&message(content, vec![attachment("u")])).unwrap_err(),
            DecodeError::InvalidJson(_)
        ));
    }
}
