use promptlab_core::config::load_config;
use promptlab_core::model::ProviderKind;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{tempdir, NamedTempFile};

#[test]
fn test_config_version_defaults() -> anyhow::Result<()> {
    let mut tmp = NamedTempFile::new()?;
    writeln!(
        tmp,
        r#"
models:
  - name: echo
    provider: fake
    response_text: "hello"
"#
    )?;

    let cfg = load_config(tmp.path(), false)?;
    assert_eq!(cfg.version, 0, "Default version should be 0 (unversioned)");
    assert_eq!(cfg.models[0].response_text.as_deref(), Some("hello"));
    Ok(())
}

#[test]
fn test_dirs_resolved_against_config_location() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let nested = dir.path().join("experiments");
    std::fs::create_dir_all(&nested)?;
    let path = nested.join("promptlab.yaml");
    std::fs::write(
        &path,
        r#"configVersion: 1
prompts_dir: prompts
output_dir: ../runs
models:
  - { name: gpt-4o, provider: openai, temperature: 0.1, max_tokens: 2000, repeat: 3 }
"#,
    )?;

    let cfg = load_config(&path, true)?;
    assert_eq!(PathBuf::from(&cfg.prompts_dir), nested.join("prompts"));
    assert_eq!(PathBuf::from(&cfg.output_dir), dir.path().join("runs"));
    assert_eq!(cfg.models[0].provider, ProviderKind::OpenAi);
    assert_eq!(cfg.models[0].repeat, 3);
    Ok(())
}

#[test]
fn test_render_section() -> anyhow::Result<()> {
    let mut tmp = NamedTempFile::new()?;
    writeln!(
        tmp,
        r#"
render:
  enabled: false
  primary_url: http://plantuml.internal:8080
models:
  - {{ name: echo, provider: fake }}
"#
    )?;

    let cfg = load_config(tmp.path(), true)?;
    assert!(!cfg.render.enabled);
    assert_eq!(cfg.render.primary_url, "http://plantuml.internal:8080");
    assert_eq!(cfg.render.fallback_url, "http://www.plantuml.com/plantuml");
    Ok(())
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = tempdir().unwrap();
    let err = load_config(&dir.path().join("absent.yaml"), false).unwrap_err();
    assert!(err.to_string().starts_with("config error: failed to read config"));
}

#[test]
fn test_unknown_provider_rejected() -> anyhow::Result<()> {
    let mut tmp = NamedTempFile::new()?;
    writeln!(tmp, "models:\n  - {{ name: x, provider: mistral }}")?;
    let err = load_config(tmp.path(), false).unwrap_err();
    assert!(err.0.contains("failed to parse YAML"));
    Ok(())
}
