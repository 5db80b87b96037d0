use crate::errors::ConfigError;
use crate::model::{ModelConfig, Parameters, ProviderKind, ProviderResult, RunStatus};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub mod anthropic;
pub mod fake;
pub mod gemini;
pub mod openai;

/// What a vendor call produced before normalization.
#[derive(Debug, Clone, Default)]
pub struct Completion {
    pub text: String,
    pub raw: Option<serde_json::Value>,
    /// Completion id, when the adapter already knows it.
    pub id: Option<String>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str, params: &Parameters) -> anyhow::Result<Completion>;

    fn provider_kind(&self) -> ProviderKind;

    /// Times [`complete`](LlmClient::complete) and folds any failure into an
    /// `error` result. Never returns an error to the caller.
    async fn send_prompt(&self, prompt: &str, params: &Parameters) -> ProviderResult {
        let start = Instant::now();
        match self.complete(prompt, params).await {
            Ok(c) => ProviderResult {
                text: c.text,
                latency: Some(start.elapsed().as_secs_f64()),
                status: RunStatus::Success,
                raw_response: c.raw,
                id: c.id,
            },
            Err(e) => {
                tracing::warn!(
                    provider = %self.provider_kind(),
                    model = %params.model,
                    error = %format!("{e:#}"),
                    "provider call failed"
                );
                ProviderResult::error(format!("{e:#}"))
            }
        }
    }
}

fn api_key(cfg: &ModelConfig) -> Result<Option<String>, ConfigError> {
    let Some(default_env) = cfg.provider.default_api_key_env() else {
        return Ok(None);
    };
    let var = cfg.api_key_env.as_deref().unwrap_or(default_env);
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => Ok(Some(v)),
        _ => Err(ConfigError(format!(
            "{} API key not found in environment variable '{}' (model '{}')",
            cfg.provider, var, cfg.name
        ))),
    }
}

/// Builds the adapter for one configured model.
///
/// Fails when the provider needs an API key and its environment variable is
/// unset or empty.
pub fn build_client(cfg: &ModelConfig, timeout: Duration) -> Result<Arc<dyn LlmClient>, ConfigError> {
    let key = api_key(cfg)?.unwrap_or_default();
    let http = || {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError(format!("failed to build HTTP client: {}", e)))
    };

    let client: Arc<dyn LlmClient> = match cfg.provider {
        ProviderKind::OpenAi => Arc::new(openai::OpenAIClient::new(
            ProviderKind::OpenAi,
            cfg.base_url.clone().unwrap_or_else(|| openai::OPENAI_BASE_URL.into()),
            key,
            http()?,
        )),
        ProviderKind::DeepSeek => Arc::new(openai::OpenAIClient::new(
            ProviderKind::DeepSeek,
            cfg.base_url.clone().unwrap_or_else(|| openai::DEEPSEEK_BASE_URL.into()),
            key,
            http()?,
        )),
        ProviderKind::Anthropic => Arc::new(anthropic::AnthropicClient::new(
            cfg.base_url.clone().unwrap_or_else(|| anthropic::DEFAULT_BASE_URL.into()),
            key,
            http()?,
        )),
        ProviderKind::Gemini => Arc::new(gemini::GeminiClient::new(
            cfg.base_url.clone().unwrap_or_else(|| gemini::DEFAULT_BASE_URL.into()),
            key,
            http()?,
        )),
        ProviderKind::Fake => Arc::new(fake::FakeClient::new(
            cfg.response_text.clone().unwrap_or_default(),
        )),
    };
    Ok(client)
}
