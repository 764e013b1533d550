//! Native Google Gemini provider (`generateContent`).
//!
//! The grounding context is sent as `systemInstruction`, prior turns and the
//! new message as `contents`. The reply is the concatenated text parts of the
//! first candidate.

use async_trait::async_trait;
use atombot_core::error::ServiceError;
use atombot_core::message::Role;
use atombot_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini via the Generative Language REST API.
pub struct GeminiProvider {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a provider; `None` or a blank key makes every call fail with
    /// [`ServiceError::NotConfigured`].
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.into(),
            client: crate::http_client(),
        }
    }

    /// Point at a different endpoint (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_key(&self) -> Result<&str, ServiceError> {
        self.api_key.as_deref().ok_or_else(|| {
            ServiceError::NotConfigured(
                "No Gemini API key. Set GEMINI_API_KEY or api_key in config.toml".into(),
            )
        })
    }

    fn build_body(request: &GenerateRequest) -> ApiRequest {
        let mut contents: Vec<ApiContent> = request
            .turns
            .iter()
            .map(|turn| ApiContent::text(turn.role, &turn.content))
            .collect();
        contents.push(ApiContent::text(Role::User, &request.message));

        ApiRequest {
            system_instruction: ApiSystemInstruction {
                parts: vec![ApiPart {
                    text: Some(request.system_context.clone()),
                }],
            },
            contents,
            generation_config: ApiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
        }
    }

    /// Pull reply text out of a parsed response.
    fn extract(response: ApiResponse, requested_model: &str) -> Result<GenerateResponse, ServiceError> {
        let blocked = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason);

        let Some(candidate) = response.candidates.into_iter().next() else {
            return Err(match blocked {
                Some(reason) => ServiceError::Blocked { reason },
                None => ServiceError::MalformedResponse("No candidates in response".into()),
            });
        };

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            if let Some(reason) = candidate.finish_reason.filter(|r| r == "SAFETY") {
                return Err(ServiceError::Blocked { reason });
            }
            return Err(ServiceError::EmptyResponse);
        }

        let usage = response.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(GenerateResponse {
            text,
            model: response
                .model_version
                .unwrap_or_else(|| requested_model.to_string()),
            usage,
        })
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ServiceError> {
        let api_key = self.api_key()?;
        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);
        let body = Self::build_body(&request);

        debug!(
            model = %request.model,
            turns = request.turns.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ServiceError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ServiceError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            // Gemini reports a bad key as 400 INVALID_ARGUMENT
            if status == 400 && error_body.contains("API_KEY_INVALID") {
                return Err(ServiceError::AuthenticationFailed("API key not valid".into()));
            }
            warn!(status, body = %error_body, "Gemini returned error");
            return Err(ServiceError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse(format!("Failed to parse response: {e}")))?;

        Self::extract(api_response, &request.model)
    }

    async fn health_check(&self) -> Result<bool, ServiceError> {
        let api_key = self.api_key()?;
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", api_key)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- Gemini API types (internal) ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    system_instruction: ApiSystemInstruction,
    contents: Vec<ApiContent>,
    generation_config: ApiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct ApiSystemInstruction {
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ApiPart>,
}

impl ApiContent {
    fn text(role: Role, text: &str) -> Self {
        Self {
            role: Some(role.as_str().to_string()),
            parts: vec![ApiPart {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<ApiPromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<ApiUsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}
