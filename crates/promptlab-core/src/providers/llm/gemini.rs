use super::{Completion, LlmClient};
use crate::model::{Parameters, ProviderKind};
use async_trait::async_trait;
use serde_json::json;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    pub base_url: String,
    pub api_key: String,
    pub client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(base_url: String, api_key: String, client: reqwest::Client) -> Self {
        Self {
            base_url,
            api_key,
            client,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

pub(crate) fn request_body(prompt: &str, params: &Parameters) -> serde_json::Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "temperature": params.temperature,
            "maxOutputTokens": params.max_tokens,
        },
    })
}

/// Concatenates every text part of the first candidate. No candidates (e.g.
/// blocked by safety filters) gives an empty answer.
pub(crate) fn response_text(json: &serde_json::Value) -> String {
    json.pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, prompt: &str, params: &Parameters) -> anyhow::Result<Completion> {
        let resp = self
            .client
            .post(self.endpoint(&params.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(prompt, params))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Gemini generateContent error ({}): {}", status, body);
        }

        let json: serde_json::Value = resp.json().await?;
        let text = response_text(&json);
        let id = json
            .get("responseId")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(Completion {
            text,
            raw: Some(json),
            id,
        })
    }

    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }
}
