//! The Atom admissions assistant.
//!
//! - [`knowledge`] builds the grounding context from program data
//! - [`history`] stores one conversation's messages
//! - [`gateway`] turns history + a new message into one provider request
//! - [`controller`] is the `Idle` / `AwaitingReply` state machine
//! - [`session`] runs whole turns for simple hosts

pub mod controller;
pub mod gateway;
pub mod history;
pub mod knowledge;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use controller::{
    ChatState, CompletedReply, ConversationController, Modifiers, PendingReply, StaleReply,
    SubmitRejected, Ticket, is_send_keystroke,
};
pub use gateway::{GatewaySettings, HistoryWindow, ResponseGateway};
pub use history::{HistorySnapshot, MessageHistory};
pub use knowledge::{KnowledgeContext, build_context};
pub use session::{ChatSession, SendOutcome};
