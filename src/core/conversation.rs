use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::message::Message;

/// Ordered transcript of the conversation that is sent to the completion
/// service.
///
/// Cloning the store yields another handle to the same transcript. Every
/// operation takes the same lock, and [`ConversationStore::snapshot`] hands out
/// an owned copy so that a request already in flight never observes later
/// appends or resets.
#[derive(Clone, Default)]
pub struct ConversationStore {
    entries: Arc<Mutex<Vec<Message>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_user(&self, text: impl Into<String>) {
        self.lock().push(Message::user(text));
    }

    /// Only call this once a successful reply has been shown to the user.
    pub fn append_assistant(&self, text: impl Into<String>) {
        self.lock().push(Message::assistant(text));
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().clone()
    }

    pub fn reset(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave a half-written Vec behind,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Vec<Message>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
