//! Conversation controller: the chat widget's state machine.
//!
//! ```text
//!            submit(text) ──► AwaitingReply { ticket }
//!   Idle  ◄── complete(reply | failure) ──┘
//! ```
//!
//! `submit` hands out a [`PendingReply`], the only way to reach the gateway.
//! While one is outstanding every further submit is dropped, so at most one
//! request is in flight per conversation and replies land in issue order.
//! The host awaits [`PendingReply::dispatch`] and feeds the result back via
//! [`ConversationController::complete`].

use std::sync::Arc;

use atombot_config::{AppConfig, ProgramData};
use atombot_core::error::ServiceError;
use atombot_core::event::{DomainEvent, EventBus, preview};
use atombot_core::message::{ConversationId, Message, Role};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::gateway::ResponseGateway;
use crate::history::{HistorySnapshot, MessageHistory};
use crate::knowledge::KnowledgeContext;

const PREVIEW_CHARS: usize = 80;

/// Identifies one submitted message and the reply it is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    AwaitingReply { ticket: Ticket },
}

/// Why a submit did not start a turn. Never shown to the end user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error("input is empty")]
    EmptyInput,

    #[error("a reply is already in flight")]
    ReplyInFlight,
}

impl SubmitRejected {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::ReplyInFlight => "reply_in_flight",
        }
    }
}

/// A completion whose ticket is not the one in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("reply {ticket} is stale")]
pub struct StaleReply {
    pub ticket: Ticket,
}

/// Everything one outbound request needs, frozen at submit time.
#[derive(Debug, Clone)]
pub struct PendingReply {
    ticket: Ticket,
    context: Arc<str>,
    history: HistorySnapshot,
    message: String,
}

impl PendingReply {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// History before the new message was appended.
    pub fn history(&self) -> &HistorySnapshot {
        &self.history
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Run the outbound request. This is the only await in a turn.
    pub async fn dispatch(self, gateway: &ResponseGateway) -> CompletedReply {
        let result = gateway
            .request_reply(&self.context, &self.history, &self.message)
            .await;
        CompletedReply {
            ticket: self.ticket,
            result,
        }
    }
}

/// The outcome of a dispatched request, ready for [`ConversationController::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedReply {
    ticket: Ticket,
    result: Result<String, ServiceError>,
}

impl CompletedReply {
    pub fn new(ticket: Ticket, result: Result<String, ServiceError>) -> Self {
        Self { ticket, result }
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn result(&self) -> &Result<String, ServiceError> {
        &self.result
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Keyboard modifier state accompanying a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// Enter without any modifier sends; Shift+Enter and friends do not.
pub fn is_send_keystroke(key: &str, modifiers: Modifiers) -> bool {
    key == "Enter" && modifiers.is_empty()
}

fn publish(events: Option<&EventBus>, event: DomainEvent) {
    if let Some(bus) = events {
        bus.publish(event);
    }
}

pub struct ConversationController {
    id: ConversationId,
    history: MessageHistory,
    knowledge: Arc<KnowledgeContext>,
    fallback_message: String,
    state: ChatState,
    next_ticket: u64,
    panel_open: bool,
    events: Option<Arc<EventBus>>,
}

impl ConversationController {
    pub fn new(
        history: MessageHistory,
        knowledge: Arc<KnowledgeContext>,
        fallback_message: impl Into<String>,
    ) -> Self {
        Self {
            id: ConversationId::new(),
            history,
            knowledge,
            fallback_message: fallback_message.into(),
            state: ChatState::Idle,
            next_ticket: 1,
            panel_open: false,
            events: None,
        }
    }

    /// Controller with greeting, fallback and persona taken from `config`.
    pub fn from_config(config: &AppConfig, program: impl Into<Arc<ProgramData>>) -> Self {
        let knowledge = KnowledgeContext::new(program, config.persona.clone());
        Self::new(
            MessageHistory::new(config.assistant.greeting.clone()),
            Arc::new(knowledge),
            config.assistant.fallback_message.clone(),
        )
    }

    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn history(&self) -> &MessageHistory {
        &self.history
    }

    /// Immutable copy of the conversation for rendering.
    pub fn messages(&self) -> HistorySnapshot {
        self.history.snapshot()
    }

    pub fn knowledge(&self) -> &KnowledgeContext {
        &self.knowledge
    }

    pub fn fallback_message(&self) -> &str {
        &self.fallback_message
    }

    /// Loading indicator binding.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, ChatState::AwaitingReply { .. })
    }

    /// Send button binding: disabled while loading or while the input is blank.
    pub fn can_send(&self, pending_input: &str) -> bool {
        !self.is_loading() && !pending_input.trim().is_empty()
    }

    pub fn is_open(&self) -> bool {
        self.panel_open
    }

    pub fn open(&mut self) {
        self.panel_open = true;
    }

    pub fn close(&mut self) {
        self.panel_open = false;
    }

    pub fn toggle(&mut self) {
        self.panel_open = !self.panel_open;
    }

    /// Start a turn.
    ///
    /// Blank input and input arriving while a reply is in flight are dropped
    /// without touching the history.
    pub fn submit(&mut self, text: &str) -> Result<PendingReply, SubmitRejected> {
        let rejected = if text.trim().is_empty() {
            Some(SubmitRejected::EmptyInput)
        } else if self.is_loading() {
            Some(SubmitRejected::ReplyInFlight)
        } else {
            None
        };

        if let Some(reason) = rejected {
            debug!(conversation_id = %self.id, reason = reason.as_str(), "Submit rejected");
            publish(
                self.events.as_deref(),
                DomainEvent::SubmitRejected {
                    conversation_id: self.id.0.clone(),
                    reason: reason.as_str().into(),
                    timestamp: Utc::now(),
                },
            );
            return Err(reason);
        }

        // Prior turns only; the new message travels separately.
        let history = self.history.snapshot();
        let context = self.knowledge.get();

        let index = self.history.len();
        self.history.append_user(text);

        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.state = ChatState::AwaitingReply { ticket };

        debug!(conversation_id = %self.id, %ticket, turns = history.len(), "Turn submitted");
        self.emit_appended(Role::User, text, index);
        self.emit_state();

        Ok(PendingReply {
            ticket,
            context,
            history,
            message: text.to_string(),
        })
    }

    /// Finish the in-flight turn with a reply or the fallback message.
    pub fn complete(&mut self, reply: CompletedReply) -> Result<&Message, StaleReply> {
        match self.state {
            ChatState::AwaitingReply { ticket } if ticket == reply.ticket => {}
            _ => {
                warn!(conversation_id = %self.id, ticket = %reply.ticket, "Dropping stale reply");
                return Err(StaleReply {
                    ticket: reply.ticket,
                });
            }
        }

        self.state = ChatState::Idle;
        let index = self.history.len();

        let text = match reply.result {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    conversation_id = %self.id,
                    kind = e.kind(),
                    error = %e,
                    "Reply failed, using fallback message"
                );
                publish(
                    self.events.as_deref(),
                    DomainEvent::ReplyFailed {
                        conversation_id: self.id.0.clone(),
                        error_kind: e.kind().into(),
                        error_message: e.to_string(),
                        timestamp: Utc::now(),
                    },
                );
                self.fallback_message.clone()
            }
        };

        let events = self.events.as_deref();
        let message = self.history.append_model(text);
        publish(events, appended_event(&self.id, Role::Model, &message.text, index));
        publish(events, state_event(&self.id, false));
        Ok(message)
    }

    /// Back to a single greeting; an in-flight reply becomes stale.
    pub fn reset(&mut self) {
        let was_loading = self.is_loading();
        self.history.reset();
        self.state = ChatState::Idle;
        info!(conversation_id = %self.id, "Conversation reset");
        if was_loading {
            self.emit_state();
        }
    }

    fn emit_appended(&self, role: Role, text: &str, index: usize) {
        publish(self.events.as_deref(), appended_event(&self.id, role, text, index));
    }

    fn emit_state(&self) {
        publish(self.events.as_deref(), state_event(&self.id, self.is_loading()));
    }
}

fn appended_event(id: &ConversationId, role: Role, text: &str, index: usize) -> DomainEvent {
    DomainEvent::MessageAppended {
        conversation_id: id.0.clone(),
        role,
        content_preview: preview(text, PREVIEW_CHARS),
        index,
        timestamp: Utc::now(),
    }
}

fn state_event(id: &ConversationId, awaiting_reply: bool) -> DomainEvent {
    DomainEvent::StateChanged {
        conversation_id: id.0.clone(),
        awaiting_reply,
        timestamp: Utc::now(),
    }
}

impl std::fmt::Debug for ConversationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationController")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("messages", &self.history.len())
            .field("panel_open", &self.panel_open)
            .finish()
    }
}
