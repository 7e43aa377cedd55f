//! Append-only chat transcript.
//!
//! `Transcript` is a cheap-to-clone handle: clones share the same
//! underlying sequence, so a UI can hold one and render snapshots while a
//! send is in flight. Only the session appends. Entries are never
//! reordered, removed, or deduplicated.

use std::sync::{Arc, RwLock};

use threadline_types::chat::ChatMessage;

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    inner: Arc<RwLock<Vec<ChatMessage>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, message: ChatMessage) {
        // A poisoned lock still holds a consistent Vec: pushes cannot panic midway.
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        guard.push(message);
    }

    /// Cloned copy of every entry, in display order.
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last(&self) -> Option<ChatMessage> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
