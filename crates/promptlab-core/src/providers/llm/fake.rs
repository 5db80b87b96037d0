use super::{Completion, LlmClient};
use crate::model::{Parameters, ProviderKind};
use async_trait::async_trait;
use std::sync::Mutex;

/// Offline provider: answers every prompt with a fixed text (or a fixed error).
pub struct FakeClient {
    response: Result<String, String>,
    calls: Mutex<Vec<(String, Parameters)>>,
}

impl FakeClient {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Prompts and parameters seen so far, oldest first.
    pub fn calls(&self) -> Vec<(String, Parameters)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(&self, prompt: &str, params: &Parameters) -> anyhow::Result<Completion> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((prompt.to_string(), params.clone()));
        }
        match &self.response {
            Ok(text) => Ok(Completion {
                text: text.clone(),
                raw: None,
                id: None,
            }),
            Err(msg) => anyhow::bail!("{}", msg),
        }
    }

    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::Fake
    }
}
