use super::{Completion, LlmClient};
use crate::model::{Parameters, ProviderKind};
use async_trait::async_trait;
use serde_json::json;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

/// Chat Completions client. DeepSeek speaks the same wire format, so it
/// reuses this type with a different base URL and kind.
pub struct OpenAIClient {
    pub kind: ProviderKind,
    pub base_url: String,
    pub api_key: String,
    pub client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(kind: ProviderKind, base_url: String, api_key: String, client: reqwest::Client) -> Self {
        Self {
            kind,
            base_url,
            api_key,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

pub(crate) fn request_body(prompt: &str, params: &Parameters) -> serde_json::Value {
    json!({
        "model": params.model,
        "messages": [{ "role": "user", "content": prompt }],
        "temperature": params.temperature,
        "max_tokens": params.max_tokens,
    })
}

pub(crate) fn response_text(json: &serde_json::Value) -> anyhow::Result<String> {
    // A null content (e.g. refusal or tool call) is an empty answer, not a failure.
    match json.pointer("/choices/0/message/content") {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(serde_json::Value::Null) => Ok(String::new()),
        _ => anyhow::bail!("chat completion response missing choices[0].message.content"),
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, prompt: &str, params: &Parameters) -> anyhow::Result<Completion> {
        let resp = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body(prompt, params))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!("{} chat API error ({}): {}", self.kind, status, error_text);
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
        self.kind
    }
}
