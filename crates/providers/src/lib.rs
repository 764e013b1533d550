//! Text-generation provider implementations for AtomBot.
//!
//! All providers implement the `atombot_core::Provider` trait.
//! The router builds the provider named in configuration.

pub mod gemini;
pub mod openai_compat;
pub mod router;

pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;

/// Shared HTTP client settings for all providers.
///
/// The transport timeout is a backstop; the response gateway applies the
/// configured per-reply timeout.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to build HTTP client, using defaults");
            reqwest::Client::new()
        })
}
