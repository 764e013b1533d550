//! Domain event system: lets a UI layer follow a conversation.
//!
//! The controller publishes an event whenever something visible changes
//! (a message was appended, the loading state flipped, a submit was dropped).
//! A renderer subscribes and redraws without polling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use crate::message::Role;

/// Something a renderer may want to redraw for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A message was appended to a conversation
    MessageAppended {
        conversation_id: String,
        role: Role,
        content_preview: String,
        index: usize,
        timestamp: DateTime<Utc>,
    },

    /// The controller moved between `idle` and `awaiting_reply`
    StateChanged {
        conversation_id: String,
        awaiting_reply: bool,
        timestamp: DateTime<Utc>,
    },

    /// A submit was refused (empty input or a reply already in flight)
    SubmitRejected {
        conversation_id: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// The backend failed and the fallback message was used
    ReplyFailed {
        conversation_id: String,
        error_kind: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// Fan-out of conversation events. Slow subscribers lag and lose events
/// rather than blocking the controller.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// `capacity` events are buffered per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Truncate text for event previews without splitting a character.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}
