//! ChatSession: one conversation wired to a gateway.
//!
//! Runs a whole turn (submit, dispatch, complete) per [`ChatSession::send`].
//! Hosts that need to accept input while a reply is in flight drive the
//! [`ConversationController`] directly instead.

use std::sync::Arc;

use atombot_config::{AppConfig, ConfigError};
use atombot_core::event::EventBus;
use atombot_core::message::Message;
use atombot_core::provider::Provider;

use crate::controller::{ConversationController, StaleReply, SubmitRejected};
use crate::gateway::ResponseGateway;
use crate::history::HistorySnapshot;

/// What happened to one `send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The service answered; the reply was appended
    Replied(Message),
    /// The service failed; the fallback message was appended
    FellBack(Message),
    /// Nothing was sent
    Rejected(SubmitRejected),
    /// The turn was superseded before its reply arrived
    Stale(StaleReply),
}

impl SendOutcome {
    /// The appended model message, if any.
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Replied(m) | Self::FellBack(m) => Some(m),
            Self::Rejected(_) | Self::Stale(_) => None,
        }
    }
}

pub struct ChatSession {
    controller: ConversationController,
    gateway: Arc<ResponseGateway>,
}

impl ChatSession {
    pub fn new(controller: ConversationController, gateway: Arc<ResponseGateway>) -> Self {
        Self {
            controller,
            gateway,
        }
    }

    /// Build controller and gateway from configuration.
    pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>) -> Result<Self, ConfigError> {
        let program = config.load_program()?;
        let missing = program.empty_sections();
        if !missing.is_empty() {
            tracing::warn!(sections = ?missing, "Program data has empty sections");
        }

        let controller = ConversationController::from_config(config, program);
        let gateway = ResponseGateway::from_config(config, provider);
        tracing::info!(
            conversation_id = %controller.id(),
            provider = gateway.provider_name(),
            model = %gateway.settings().model,
            "Chat session started"
        );
        Ok(Self::new(controller, Arc::new(gateway)))
    }

    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.controller = self.controller.with_event_bus(events);
        self
    }

    /// Run one full turn.
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        let pending = match self.controller.submit(text) {
            Ok(pending) => pending,
            Err(reason) => return SendOutcome::Rejected(reason),
        };

        let completed = pending.dispatch(&self.gateway).await;
        let succeeded = completed.is_success();

        match self.controller.complete(completed) {
            Ok(message) if succeeded => SendOutcome::Replied(message.clone()),
            Ok(message) => SendOutcome::FellBack(message.clone()),
            Err(stale) => SendOutcome::Stale(stale),
        }
    }

    pub fn greeting(&self) -> &str {
        self.controller.history().greeting()
    }

    pub fn messages(&self) -> HistorySnapshot {
        self.controller.messages()
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ConversationController {
        &mut self.controller
    }

    pub fn gateway(&self) -> &Arc<ResponseGateway> {
        &self.gateway
    }
}
