use serde::{Deserialize, Serialize};

/// Placeholder written for metadata fields a provider does not expose.
pub const NOT_AVAILABLE: &str = "N/A";

pub const DEFAULT_PROMPTS_DIR: &str = "prompts";
pub const DEFAULT_OUTPUT_DIR: &str = "test_runs";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_PRIMARY_RENDER_URL: &str = "http://localhost:8080";
pub const DEFAULT_FALLBACK_RENDER_URL: &str = "http://www.plantuml.com/plantuml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    #[serde(default, rename = "configVersion", alias = "version")]
    pub version: u32,
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub render: RenderSettings,
    pub models: Vec<ModelConfig>,
}

impl Default for ExperimentConfig {
    /// One `gpt-4o` model sampled three times at 0.1.
    fn default() -> Self {
        Self {
            version: 1,
            prompts_dir: default_prompts_dir(),
            output_dir: default_output_dir(),
            timeout_seconds: None,
            render: RenderSettings::default(),
            models: vec![ModelConfig {
                name: "gpt-4o".into(),
                provider: ProviderKind::OpenAi,
                temperature: 0.1,
                max_tokens: 2000,
                repeat: 3,
                base_url: None,
                api_key_env: None,
                response_text: None,
            }],
        }
    }
}

fn default_prompts_dir() -> String {
    DEFAULT_PROMPTS_DIR.into()
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_primary_url")]
    pub primary_url: String,
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            primary_url: default_primary_url(),
            fallback_url: default_fallback_url(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_primary_url() -> String {
    DEFAULT_PRIMARY_RENDER_URL.into()
}

fn default_fallback_url() -> String {
    DEFAULT_FALLBACK_RENDER_URL.into()
}

/// One entry of the `models:` list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    pub name: String,
    pub provider: ProviderKind,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Canned answer for the `fake` provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_repeat() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    DeepSeek,
    Anthropic,
    Gemini,
    Fake,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Fake => "fake",
        }
    }

    /// Environment variable holding the API key, if the provider needs one.
    pub fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::DeepSeek => Some("DEEPSEEK_API_KEY"),
            ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderKind::Gemini => Some("GEMINI_API_KEY"),
            ProviderKind::Fake => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub name: String,
    pub text: String,
}

/// Sampling parameters handed to a provider for a single call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameters {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Error => "error",
        }
    }
}

/// Normalized outcome of one provider call.
#[derive(Debug, Clone)]
pub struct ProviderResult {
    pub text: String,
    /// Wall-clock seconds; `None` when the call failed.
    pub latency: Option<f64>,
    pub status: RunStatus,
    pub raw_response: Option<serde_json::Value>,
    pub id: Option<String>,
}

impl ProviderResult {
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            text: format!("ERROR: {}", message),
            latency: None,
            status: RunStatus::Error,
            raw_response: None,
            id: None,
        }
    }
}

/// Provider-specific details pulled out of a raw response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataFields {
    pub completion_id: Option<String>,
    pub model_version: Option<String>,
    pub system_fingerprint: Option<String>,
    pub created: Option<String>,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Contents of `<prompt>_<hash>_METADATA.json`. Field order is the file's key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub prompt_name: String,
    pub model: String,
    pub model_version: String,
    pub temperature: f64,
    pub prompt_hash: String,
    pub completion_id: String,
    pub system_fingerprint: String,
    pub timestamp: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub latency: Option<f64>,
    pub status: RunStatus,
}

impl MetadataRecord {
    pub fn new(
        prompt: &Prompt,
        prompt_hash: &str,
        params: &Parameters,
        result: &ProviderResult,
        fields: MetadataFields,
    ) -> Self {
        let or_na = |v: Option<String>| v.unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let completion_id = result.id.clone().or(fields.completion_id);
        Self {
            prompt_name: prompt.name.clone(),
            model: params.model.clone(),
            model_version: or_na(fields.model_version),
            temperature: params.temperature,
            prompt_hash: prompt_hash.to_string(),
            completion_id: or_na(completion_id),
            system_fingerprint: or_na(fields.system_fingerprint),
            timestamp: fields.created.unwrap_or_else(crate::fingerprint::timestamp),
            prompt_tokens: fields.prompt_tokens,
            completion_tokens: fields.completion_tokens,
            total_tokens: fields.total_tokens,
            latency: result.latency,
            status: result.status,
        }
    }
}
