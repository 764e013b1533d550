//! Message history store: the ordered log of one conversation.
//!
//! Append-only until [`MessageHistory::reset`]. The store stamps every
//! message itself, clamped so timestamps never decrease in insertion order.
//! Snapshots share storage copy-on-write: a later append never alters a
//! snapshot already handed out.

use std::ops::Deref;
use std::sync::Arc;

use atombot_core::message::{Message, Role, Turn, now_millis};

/// Source of epoch-millisecond timestamps.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub struct MessageHistory {
    messages: Arc<Vec<Message>>,
    greeting: String,
    clock: Clock,
    last_timestamp: i64,
}

impl MessageHistory {
    /// A history seeded with one model greeting, stamped by the wall clock.
    pub fn new(greeting: impl Into<String>) -> Self {
        Self::with_clock(greeting, Arc::new(now_millis))
    }

    /// A history stamped by `clock`.
    pub fn with_clock(greeting: impl Into<String>, clock: Clock) -> Self {
        let mut history = Self {
            messages: Arc::new(Vec::new()),
            greeting: greeting.into(),
            clock,
            last_timestamp: i64::MIN,
        };
        history.seed();
        history
    }

    fn seed(&mut self) {
        let greeting = Message::new(Role::Model, self.greeting.clone());
        self.messages = Arc::new(Vec::with_capacity(8));
        self.append(greeting);
    }

    fn next_timestamp(&mut self) -> i64 {
        let now = (self.clock)().max(self.last_timestamp);
        self.last_timestamp = now;
        now
    }

    /// Append a message, replacing its timestamp with the store's own.
    pub fn append(&mut self, message: Message) -> &Message {
        let timestamp = self.next_timestamp();
        let messages = Arc::make_mut(&mut self.messages);
        messages.push(Message {
            timestamp,
            ..message
        });
        &messages[messages.len() - 1]
    }

    pub fn append_user(&mut self, text: impl Into<String>) -> &Message {
        self.append(Message::user(text))
    }

    pub fn append_model(&mut self, text: impl Into<String>) -> &Message {
        self.append(Message::model(text))
    }

    /// Immutable view of the history as it is now.
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot(Arc::clone(&self.messages))
    }

    /// Drop everything and re-seed the greeting.
    pub fn reset(&mut self) {
        self.seed();
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false after construction; kept for API completeness.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl std::fmt::Debug for MessageHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageHistory")
            .field("messages", &self.messages)
            .finish()
    }
}

/// A frozen copy of the history at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySnapshot(Arc<Vec<Message>>);

impl HistorySnapshot {
    /// Wire form, oldest first.
    pub fn to_turns(&self) -> Vec<Turn> {
        self.0.iter().map(Turn::from).collect()
    }
}

impl Deref for HistorySnapshot {
    type Target = [Message];

    fn deref(&self) -> &[Message] {
        &self.0
    }
}
