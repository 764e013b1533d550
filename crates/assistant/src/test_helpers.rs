//! Shared mock providers for assistant tests.

use async_trait::async_trait;
use atombot_core::error::ServiceError;
use atombot_core::provider::{GenerateRequest, GenerateResponse, Provider};
use std::sync::Mutex;
use tokio::sync::Notify;

fn text_response(text: &str, request: &GenerateRequest) -> GenerateResponse {
    GenerateResponse {
        text: text.to_string(),
        model: request.model.clone(),
        usage: None,
    }
}

/// Returns scripted replies in order and records every request.
///
/// Panics if called more times than replies were scripted.
pub struct ScriptedProvider {
    replies: Mutex<Vec<Result<String, ServiceError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<String, ServiceError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ServiceError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            panic!("ScriptedProvider: no more replies (call #{call})");
        }
        replies
            .remove(0)
            .map(|text| text_response(&text, &request))
    }
}

/// Always fails with the given error.
pub struct FailingProvider {
    error: ServiceError,
    call_count: Mutex<usize>,
}

impl FailingProvider {
    pub fn new(error: ServiceError) -> Self {
        Self {
            error,
            call_count: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing_mock"
    }

    async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse, ServiceError> {
        *self.call_count.lock().unwrap() += 1;
        Err(self.error.clone())
    }
}

/// Never answers (for timeout testing).
pub struct HangingProvider;

#[async_trait]
impl Provider for HangingProvider {
    fn name(&self) -> &str {
        "hanging_mock"
    }

    async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse, ServiceError> {
        std::future::pending().await
    }
}

/// Holds each reply until [`GatedProvider::release`] is called.
pub struct GatedProvider {
    reply: String,
    gate: Notify,
    call_count: Mutex<usize>,
}

impl GatedProvider {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            gate: Notify::new(),
            call_count: Mutex::new(0),
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl Provider for GatedProvider {
    fn name(&self) -> &str {
        "gated_mock"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ServiceError> {
        *self.call_count.lock().unwrap() += 1;
        self.gate.notified().await;
        Ok(text_response(&self.reply, &request))
    }
}
