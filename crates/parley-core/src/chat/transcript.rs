//! In-memory conversation transcript backed by a durable cache.

use parley_types::chat::Message;
use tracing::{debug, warn};

use crate::storage::HistoryStore;

/// Maximum number of messages mirrored to the durable cache.
pub const HISTORY_CAP: usize = 100;

/// The ordered conversation transcript.
///
/// Holds the full session in memory and mirrors the most recent
/// [`HISTORY_CAP`] messages to the history store on each persist.
/// The in-memory list itself is unbounded for the session.
pub struct TranscriptStore<H> {
    messages: Vec<Message>,
    /// Index of the assistant message currently receiving fragments.
    active: Option<usize>,
    history: H,
}

impl<H: HistoryStore> TranscriptStore<H> {
    /// Start with an empty transcript.
    pub fn new(history: H) -> Self {
        Self {
            messages: Vec::new(),
            active: None,
            history,
        }
    }

    /// Start from the cached transcript, if one exists.
    ///
    /// A missing or unreadable cache degrades to an empty transcript so
    /// the session always starts.
    pub async fn restore(history: H) -> Self {
        let messages = match history.load().await {
            Ok(Some(messages)) => messages,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("failed to restore chat history: {err}");
                Vec::new()
            }
        };
        Self {
            messages,
            active: None,
            history,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Append an empty assistant message and mark it as the fragment target.
    pub fn begin_assistant_turn(&mut self) {
        self.messages.push(Message::assistant(""));
        self.active = Some(self.messages.len() - 1);
    }

    /// Append a streamed fragment to the active assistant message.
    pub fn append_to_active(&mut self, fragment: &str) {
        match self.active {
            Some(index) => self.messages[index].content.push_str(fragment),
            None => debug!("dropping fragment with no active assistant turn"),
        }
    }

    /// Close out the active assistant turn, if any.
    pub fn end_assistant_turn(&mut self) {
        self.active = None;
    }

    /// Mirror the most recent messages to the durable cache.
    pub async fn persist(&self) -> Result<(), parley_types::error::HistoryError> {
        let start = self.messages.len().saturating_sub(HISTORY_CAP);
        self.history.save(&self.messages[start..]).await
    }

    /// Drop the in-memory transcript and delete the cached copy.
    pub async fn clear(&mut self) -> Result<(), parley_types::error::HistoryError> {
        self.messages.clear();
        self.active = None;
        self.history.clear().await
    }
}
