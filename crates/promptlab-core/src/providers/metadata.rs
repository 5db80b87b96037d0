//! Per-vendor extraction of run metadata from a raw provider response.
//!
//! Each vendor family names its id, model version, creation time and token
//! counters differently. A normalizer maps one family's JSON onto
//! [`MetadataFields`]; absent or mistyped fields are left unset.

use crate::model::{MetadataFields, ProviderKind};
use serde_json::Value;

pub trait MetadataNormalizer: Send + Sync {
    fn extract_metadata(&self, raw: Option<&Value>) -> MetadataFields;
}

/// OpenAI Chat Completions shape (also DeepSeek).
pub struct OpenAiNormalizer;
pub struct AnthropicNormalizer;
pub struct GeminiNormalizer;
/// For providers without a raw response.
pub struct NoMetadata;

pub fn normalizer_for(kind: ProviderKind) -> &'static dyn MetadataNormalizer {
    match kind {
        ProviderKind::OpenAi | ProviderKind::DeepSeek => &OpenAiNormalizer,
        ProviderKind::Anthropic => &AnthropicNormalizer,
        ProviderKind::Gemini => &GeminiNormalizer,
        ProviderKind::Fake => &NoMetadata,
    }
}

fn str_at(v: &Value, pointer: &str) -> Option<String> {
    v.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn u64_at(v: &Value, pointer: &str) -> u64 {
    v.pointer(pointer).and_then(Value::as_u64).unwrap_or(0)
}

/// Unix seconds -> local `%Y-%m-%d %H:%M:%S`. Zero means "not set".
fn format_epoch(secs: i64) -> Option<String> {
    if secs == 0 {
        return None;
    }
    let utc = chrono::DateTime::from_timestamp(secs, 0)?;
    Some(
        utc.with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    )
}

impl MetadataNormalizer for OpenAiNormalizer {
    fn extract_metadata(&self, raw: Option<&Value>) -> MetadataFields {
        let Some(raw) = raw else {
            return MetadataFields::default();
        };
        MetadataFields {
            completion_id: str_at(raw, "/id"),
            model_version: str_at(raw, "/model"),
            system_fingerprint: str_at(raw, "/system_fingerprint"),
            created: raw
                .get("created")
                .and_then(Value::as_i64)
                .and_then(format_epoch),
            prompt_tokens: u64_at(raw, "/usage/prompt_tokens"),
            completion_tokens: u64_at(raw, "/usage/completion_tokens"),
            total_tokens: u64_at(raw, "/usage/total_tokens"),
        }
    }
}

impl MetadataNormalizer for AnthropicNormalizer {
    fn extract_metadata(&self, raw: Option<&Value>) -> MetadataFields {
        let Some(raw) = raw else {
            return MetadataFields::default();
        };
        let input = u64_at(raw, "/usage/input_tokens");
        let output = u64_at(raw, "/usage/output_tokens");
        MetadataFields {
            completion_id: str_at(raw, "/id"),
            model_version: str_at(raw, "/model"),
            system_fingerprint: None,
            created: None,
            prompt_tokens: input,
            completion_tokens: output,
            total_tokens: input + output,
        }
    }
}

impl MetadataNormalizer for GeminiNormalizer {
    fn extract_metadata(&self, raw: Option<&Value>) -> MetadataFields {
        let Some(raw) = raw else {
            return MetadataFields::default();
        };
        MetadataFields {
            completion_id: str_at(raw, "/responseId"),
            model_version: str_at(raw, "/modelVersion"),
            system_fingerprint: None,
            created: str_at(raw, "/createTime"),
            prompt_tokens: u64_at(raw, "/usageMetadata/promptTokenCount"),
            completion_tokens: u64_at(raw, "/usageMetadata/candidatesTokenCount"),
            total_tokens: u64_at(raw, "/usageMetadata/totalTokenCount"),
        }
    }
}

impl MetadataNormalizer for NoMetadata {
    fn extract_metadata(&self, _raw: Option<&Value>) -> MetadataFields {
        MetadataFields::default()
    }
}
