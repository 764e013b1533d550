//! Provider router: builds the configured text-generation backend.
//!
//! `gemini` uses the native API; every other kind is treated as an
//! OpenAI-compatible endpoint.

use std::sync::Arc;

use atombot_config::AppConfig;
use atombot_core::error::{Error, Result};
use atombot_core::provider::Provider;
use tracing::info;

use crate::gemini::GeminiProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the provider named by `config.provider.kind`.
///
/// A missing API key is not an error here: the provider is still built and
/// every call reports `ServiceError::NotConfigured`, so the conversation
/// keeps working with the fallback message.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>> {
    let kind = config.provider.kind.trim().to_ascii_lowercase();
    let base_url = config.provider.base_url.clone();

    let provider: Arc<dyn Provider> = match kind.as_str() {
        "gemini" | "google" => {
            let mut p = GeminiProvider::new(config.api_key.clone());
            if let Some(url) = base_url {
                p = p.with_base_url(url);
            }
            Arc::new(p)
        }
        "ollama" => Arc::new(OpenAiCompatProvider::ollama(base_url.as_deref())),
        other => {
            let url = match base_url.or_else(|| default_base_url(other)) {
                Some(url) => url,
                None => {
                    return Err(Error::Config {
                        message: format!(
                            "Unknown provider '{other}': set provider.base_url for custom endpoints"
                        ),
                    });
                }
            };
            let api_key = config.api_key.clone().unwrap_or_default();
            Arc::new(OpenAiCompatProvider::new(other, url, api_key))
        }
    };

    info!(provider = provider.name(), model = %config.provider.model, "Provider ready");
    Ok(provider)
}

/// Get the default base URL for well-known OpenAI-compatible providers.
fn default_base_url(provider_name: &str) -> Option<String> {
    let url = match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1",
        "openai" => "https://api.openai.com/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        "fireworks" => "https://api.fireworks.ai/inference/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url.to_string())
}
