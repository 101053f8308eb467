use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use hookvault_core::{ChunkUpload, MessageStore, StoreError, StoredAttachment, StoredMessage};

/// Order in which [`MemoryStore::list_messages`] returns messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingOrder {
    /// Most recent first, like the Discord channel endpoint.
    #[default]
    NewestFirst,
    OldestFirst,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    /// Oldest first.
    messages: Vec<StoredMessage>,
    blobs: HashMap<String, Bytes>,
    order: ListingOrder,
    fail_posts_after: Option<usize>,
    posts: usize,
    failing_deletes: HashSet<String>,
    failing_fetches: HashSet<String>,
}

/// In-process [`MessageStore`].
///
/// Attachment URLs look like `memory://<message id>/<filename>`. Listings are
/// capped at `limit` messages, like a single page of the real API, and
/// individual operations can be made to fail.
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    limit: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store with a listing page of 100 messages.
    pub fn new() -> Self {
        Self::with_limit(100)
    }

    /// Create an empty store with the given listing page size.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            limit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the listing order.
    pub fn set_listing_order(&self, order: ListingOrder) {
        self.lock().order = order;
    }

    /// Append a message as if someone else had posted it. Returns its id.
    pub fn push_message(&self, content: &str, attachments: Vec<StoredAttachment>) -> String {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id.to_string();
        inner.messages.push(StoredMessage {
            id: id.clone(),
            content: content.to_owned(),
            attachments,
        });
        id
    }

    /// Let `n` more posts succeed, then fail every post after that.
    pub fn fail_posts_after(&self, n: usize) {
        let mut inner = self.lock();
        inner.fail_posts_after = Some(inner.posts + n);
    }

    /// Make deleting `message_id` fail.
    pub fn fail_delete(&self, message_id: &str) {
        self.lock().failing_deletes.insert(message_id.to_owned());
    }

    /// Make fetching `url` fail.
    pub fn fail_fetch(&self, url: &str) {
        self.lock().failing_fetches.insert(url.to_owned());
    }

    /// Every stored message, oldest first, ignoring the page limit.
    pub fn messages(&self) -> Vec<StoredMessage> {
        self.lock().messages.clone()
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    /// Whether the store holds no messages.
    pub fn is_empty(&self) -> bool {
        self.lock().messages.is_empty()
    }
}

impl MessageStore for MemoryStore {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_messages(&self) -> Result<Vec<StoredMessage>, StoreError> {
        let inner = self.lock();
        let page = match inner.order {
            ListingOrder::NewestFirst => inner
                .messages
                .iter()
                .rev()
                .take(self.limit)
                .cloned()
                .collect(),
            ListingOrder::OldestFirst => {
                let skip = inner.messages.len().saturating_sub(self.limit);
                inner.messages.iter().skip(skip).cloned().collect()
            }
        };
        Ok(page)
    }

    async fn post_chunk(&self, upload: ChunkUpload) -> Result<Option<String>, StoreError> {
        let mut inner = self.lock();
        if inner.fail_posts_after.is_some_and(|limit| inner.posts >= limit) {
            return Err(StoreError::Status {
                status: 500,
                body: "injected post failure".into(),
            });
        }
        inner.posts += 1;
        inner.next_id += 1;
        let id = inner.next_id.to_string();
        let url = format!("memory://{id}/{}", upload.file_name);
        inner.blobs.insert(url.clone(), upload.data.clone());
        inner.messages.push(StoredMessage {
            id: id.clone(),
            content: upload.content,
            attachments: vec![StoredAttachment {
                url,
                filename: upload.file_name,
                size: Some(upload.data.len() as u64),
            }],
        });
        Ok(Some(id))
    }

    async fn delete_message(&self, message_id: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.failing_deletes.contains(message_id) {
            return Err(StoreError::Connection("injected delete failure".into()));
        }
        let Some(pos) = inner.messages.iter().position(|m| m.id == message_id) else {
            return Err(StoreError::Status {
                status: 404,
                body: "Unknown Message".into(),
            });
        };
        let removed = inner.messages.remove(pos);
        for attachment in removed.attachments {
            inner.blobs.remove(&attachment.url);
        }
        Ok(())
    }

    async fn fetch_attachment(&self, url: &str) -> Result<Bytes, StoreError> {
        let inner = self.lock();
        if inner.failing_fetches.contains(url) {
            return Err(StoreError::Connection("injected fetch failure".into()));
        }
        inner.blobs.get(url).cloned().ok_or(StoreError::Status {
            status: 404,
            body: "Not Found".into(),
        })
    }
}
