use super::{Completion, LlmClient};
use crate::model::{Parameters, ProviderKind};
use async_trait::async_trait;
use serde_json::json;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// `anthropic-version` header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    pub base_url: String,
    pub api_key: String,
    pub client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(base_url: String, api_key: String, client: reqwest::Client) -> Self {
        Self {
            base_url,
            api_key,
            client,
        }
    }
}

pub(crate) fn request_body(prompt: &str, params: &Parameters) -> serde_json::Value {
    json!({
        "model": params.model,
        "max_tokens": params.max_tokens,
        "temperature": params.temperature,
        "messages": [{ "role": "user", "content": prompt }],
    })
}

/// Text of the first `text` content block.
pub(crate) fn response_text(json: &serde_json::Value) -> anyhow::Result<String> {
    json.get("content")
        .and_then(|c| c.as_array())
        .and_then(|blocks| {
            blocks
                .iter()
                .find(|b| b.get("type").and_then(|t| t.as_str()).unwrap_or("text") == "text")
        })
        .and_then(|b| b.get("text"))
        .and_then(|t| t.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Anthropic response has no text content block"))
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, prompt: &str, params: &Parameters) -> anyhow::Result<Completion> {
        let url = format!("{}/messages", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request_body(prompt, params))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic messages API error ({}): {}", status, error_text);
        }

        let json: serde_json::Value = resp.json().await?;
        let text = response_text(&json)?;

        Ok(Completion {
            text,
            raw: Some(json),
            id: None,
        })
    }

    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }
}
