//! Provider trait: the abstraction over text-generation backends.
//!
//! A Provider receives the grounding context, the prior turns and the new
//! user message, and returns reply text or a [`ServiceError`].
//!
//! Implementations: Gemini (native), OpenAI-compatible endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ServiceError;
use crate::message::Turn;

/// One outbound request to a text-generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The model to use (e.g., "gemini-2.5-flash")
    pub model: String,

    /// Grounding text sent as the system instruction
    pub system_context: String,

    /// Prior turns, oldest first
    pub turns: Vec<Turn>,

    /// The new user message
    pub message: String,

    /// Temperature (0.0 = deterministic, 2.0 = most varied)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated text, verbatim
    pub text: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Token usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// The response gateway calls `generate()` without knowing which backend is
/// configured. One call is one outbound request; implementations must not
/// retry.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a request and get the complete reply.
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ServiceError>;

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> Result<bool, ServiceError> {
        Ok(true)
    }
}
