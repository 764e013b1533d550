//! Response gateway: one outbound request per reply.
//!
//! Maps a history snapshot into wire turns (order and roles preserved),
//! issues exactly one provider call, and hands back the reply text verbatim
//! or a [`ServiceError`]. No retries happen here.

use std::sync::Arc;
use std::time::Duration;

use atombot_config::AppConfig;
use atombot_core::error::ServiceError;
use atombot_core::message::{Message, Turn};
use atombot_core::provider::{GenerateRequest, Provider};
use tracing::{debug, warn};

/// How much prior history is replayed with each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryWindow {
    /// Replay the whole conversation
    #[default]
    All,
    /// Replay only the last `n` turns (at most `2n` messages, oldest dropped first)
    LastTurns(usize),
}

impl HistoryWindow {
    pub fn from_turns(turns: Option<usize>) -> Self {
        match turns {
            Some(n) => Self::LastTurns(n),
            None => Self::All,
        }
    }

    /// The tail of `messages` this window keeps.
    pub fn apply<'a>(&self, messages: &'a [Message]) -> &'a [Message] {
        match *self {
            Self::All => messages,
            Self::LastTurns(n) => {
                let keep = n.saturating_mul(2);
                &messages[messages.len().saturating_sub(keep)..]
            }
        }
    }
}

/// Per-request settings.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    pub window: HistoryWindow,
    /// `None` waits as long as the provider does
    pub timeout: Option<Duration>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".into(),
            temperature: 0.7,
            max_output_tokens: None,
            window: HistoryWindow::All,
            timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl GatewaySettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let timeout = match config.assistant.reply_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Self {
            model: config.provider.model.clone(),
            temperature: config.provider.temperature,
            max_output_tokens: config.provider.max_output_tokens,
            window: HistoryWindow::from_turns(config.assistant.history_window_turns),
            timeout,
        }
    }
}

pub struct ResponseGateway {
    provider: Arc<dyn Provider>,
    settings: GatewaySettings,
}

impl ResponseGateway {
    pub fn new(provider: Arc<dyn Provider>, settings: GatewaySettings) -> Self {
        Self { provider, settings }
    }

    pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>) -> Self {
        Self::new(provider, GatewaySettings::from_config(config))
    }

    pub fn with_window(mut self, window: HistoryWindow) -> Self {
        self.settings.window = window;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.settings.timeout = timeout;
        self
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Build the outbound request for one reply.
    pub fn build_request(
        &self,
        context: &str,
        history: &[Message],
        new_message: &str,
    ) -> GenerateRequest {
        let turns: Vec<Turn> = self
            .settings
            .window
            .apply(history)
            .iter()
            .map(Turn::from)
            .collect();

        GenerateRequest {
            model: self.settings.model.clone(),
            system_context: context.to_string(),
            turns,
            message: new_message.to_string(),
            temperature: self.settings.temperature,
            max_output_tokens: self.settings.max_output_tokens,
        }
    }

    /// Ask the provider for a reply. Exactly one call; never a blank string.
    pub async fn request_reply(
        &self,
        context: &str,
        history: &[Message],
        new_message: &str,
    ) -> Result<String, ServiceError> {
        let request = self.build_request(context, history, new_message);

        debug!(
            provider = self.provider.name(),
            model = %request.model,
            turns = request.turns.len(),
            "Requesting reply"
        );

        let call = self.provider.generate(request);
        let result = match self.settings.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(ServiceError::Timeout(format!(
                    "No reply within {}s",
                    limit.as_secs()
                ))),
            },
            None => call.await,
        };

        match result {
            Ok(response) if response.text.trim().is_empty() => {
                warn!(provider = self.provider.name(), "Provider returned blank text");
                Err(ServiceError::EmptyResponse)
            }
            Ok(response) => Ok(response.text),
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    kind = e.kind(),
                    error = %e,
                    "Reply request failed"
                );
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for ResponseGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseGateway")
            .field("provider", &self.provider.name())
            .field("settings", &self.settings)
            .finish()
    }
}
