use std::fmt;
use std::str::FromStr;

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

/// Number of random bytes in a generated file id.
const FILE_ID_BYTES: usize = 16;

/// Identifier shared by every chunk of one uploaded file.
///
/// Freshly generated ids are 128 bits from the operating system CSPRNG,
/// rendered as 32 lowercase hex characters. Ids read back from the channel
/// are treated as opaque strings so files written by other clients remain
/// addressable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    /// Generate a new random file id.
    pub fn generate() -> Self {
        let mut bytes = [0u8; FILE_ID_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when parsing an empty or whitespace-only file id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("file id must not be empty")]
pub struct EmptyFileId;

impl FromStr for FileId {
    type Err = EmptyFileId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EmptyFileId);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl From<&str> for FileId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
