use crate::errors::ConfigError;
use crate::model::ExperimentConfig;
use std::collections::HashSet;
use std::path::Path;

pub mod path_resolver;
pub mod resolve;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;
pub const DEFAULT_CONFIG_FILE: &str = "promptlab.yaml";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

const MAX_TEMPERATURE: f64 = 2.0;

/// Loads and validates an experiment config.
///
/// Unknown keys are a warning, or an error when `strict` is set. Relative
/// `prompts_dir`/`output_dir` are resolved against the config file's directory.
pub fn load_config(path: &Path, strict: bool) -> Result<ExperimentConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;

    let mut cfg = parse_config(&raw, strict)
        .map_err(|e| ConfigError(format!("{} (file: {})", e.0, path.display())))?;

    let r = path_resolver::PathResolver::new(path);
    r.resolve_str(&mut cfg.prompts_dir);
    r.resolve_str(&mut cfg.output_dir);

    Ok(cfg)
}

/// Parses and validates YAML without touching paths.
pub fn parse_config(raw: &str, strict: bool) -> Result<ExperimentConfig, ConfigError> {
    let mut ignored_keys = std::collections::BTreeSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(raw);

    // serde_ignored wrapper to capture unknown fields
    let cfg: ExperimentConfig = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    // YAML anchors and extension keys are allowed anywhere
    let meaningful_unknowns: Vec<_> = ignored_keys
        .iter()
        .filter(|k| {
            let leaf = k.rsplit('.').next().unwrap_or(k);
            !leaf.starts_with('_') && !leaf.starts_with("x-") && *k != "definitions"
        })
        .collect();

    if !meaningful_unknowns.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "unknown fields detected in strict mode: {:?}",
                meaningful_unknowns
            )));
        }
        tracing::warn!(fields = ?meaningful_unknowns, "ignored unknown config fields");
    }

    validate(&cfg)?;
    Ok(cfg)
}

pub fn validate(cfg: &ExperimentConfig) -> Result<(), ConfigError> {
    // Allow 0 (unversioned) or 1
    if cfg.version != 0 && cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: 0, {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }

    if cfg.models.is_empty() {
        return Err(ConfigError("config has no models".into()));
    }

    let mut seen = HashSet::new();
    for m in &cfg.models {
        if m.name.trim().is_empty() {
            return Err(ConfigError("model with empty name".into()));
        }
        if m.name.contains(['/', '\\']) || m.name == "." || m.name == ".." {
            return Err(ConfigError(format!(
                "model name '{}' cannot be used as a directory name",
                m.name
            )));
        }
        if !seen.insert(m.name.as_str()) {
            return Err(ConfigError(format!("duplicate model name '{}'", m.name)));
        }
        validate_temperature(m.temperature)
            .map_err(|e| ConfigError(format!("model '{}': {}", m.name, e.0)))?;
        if m.repeat == 0 {
            return Err(ConfigError(format!("model '{}': repeat must be at least 1", m.name)));
        }
        if m.max_tokens == 0 {
            return Err(ConfigError(format!("model '{}': max_tokens must be at least 1", m.name)));
        }
    }

    if cfg.timeout_seconds == Some(0) {
        return Err(ConfigError("timeout_seconds must be at least 1".into()));
    }
    Ok(())
}

pub fn validate_temperature(t: f64) -> Result<(), ConfigError> {
    if !t.is_finite() || !(0.0..=MAX_TEMPERATURE).contains(&t) {
        return Err(ConfigError(format!(
            "temperature {} out of range [0, {}]",
            t, MAX_TEMPERATURE
        )));
    }
    Ok(())
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, SAMPLE_CONFIG)
        .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}

pub const SAMPLE_CONFIG: &str = r#"configVersion: 1
prompts_dir: prompts
output_dir: test_runs
timeout_seconds: 120
render:
  enabled: true
  primary_url: http://localhost:8080
  fallback_url: http://www.plantuml.com/plantuml
models:
  - name: gpt-4o
    provider: openai
    temperature: 0.1
    max_tokens: 2000
    repeat: 3
  - name: claude-3-5-sonnet-latest
    provider: anthropic
    temperature: 0.3
    max_tokens: 2000
    repeat: 1
  - name: gemini-2.0-flash
    provider: gemini
    temperature: 0.3
    repeat: 1
  - name: deepseek-chat
    provider: deepseek
    temperature: 0.3
    repeat: 1
"#;
