//! # Atombot Core
//!
//! Domain types, traits, and error definitions for the admissions assistant.
//! Every other crate in the workspace depends inward on this one.
//!
//! The text-generation backend is abstracted behind [`Provider`] so the
//! conversation logic can be exercised against scripted test doubles.

pub mod error;
pub mod event;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result, ServiceError};
pub use event::{DomainEvent, EventBus};
pub use message::{ConversationId, Message, Role, Turn};
pub use provider::{GenerateRequest, GenerateResponse, Provider, Usage};
