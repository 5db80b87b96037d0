use crate::diagram::{has_markers, END_MARKER, START_MARKER};
use crate::errors::StorageError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File names of one run's artifacts, all prefixed `<prompt>_<hash>_`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub response: PathBuf,
    pub diagram_source: PathBuf,
    pub diagram_image: PathBuf,
    pub metadata: PathBuf,
}

impl ArtifactPaths {
    pub fn new(run_dir: &Path, prompt_name: &str, prompt_hash: &str) -> Self {
        let stem = format!("{prompt_name}_{prompt_hash}");
        Self {
            response: run_dir.join(format!("{stem}_RESPONSE.txt")),
            diagram_source: run_dir.join(format!("{stem}_PUML.puml")),
            diagram_image: run_dir.join(format!("{stem}_DIAGRAM.png")),
            metadata: run_dir.join(format!("{stem}_METADATA.json")),
        }
    }
}

/// `<output_dir>/<prompt>/<prompt>_<hash>.txt`
pub fn canonical_prompt_path(base_dir: &Path, prompt_name: &str, prompt_hash: &str) -> PathBuf {
    base_dir
        .join(prompt_name)
        .join(format!("{prompt_name}_{prompt_hash}.txt"))
}

/// Creates `path` and its ancestors. Returns `true` if anything was created.
pub fn ensure_directory(path: &Path) -> Result<bool, StorageError> {
    if path.is_dir() {
        return Ok(false);
    }
    std::fs::create_dir_all(path).map_err(|e| StorageError::io(path, e))?;
    tracing::info!(path = %path.display(), "created directory");
    Ok(true)
}

fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))
        }
        _ => Ok(()),
    }
}

pub fn write_text(path: &Path, content: &str) -> Result<(), StorageError> {
    ensure_parent(path)?;
    std::fs::write(path, content).map_err(|e| StorageError::io(path, e))
}

/// Writes `content` only if `path` does not exist yet. Returns `true` on write.
pub fn write_text_if_missing(path: &Path, content: &str) -> Result<bool, StorageError> {
    if path.exists() {
        return Ok(false);
    }
    write_text(path, content)?;
    Ok(true)
}

/// Pretty JSON (2-space indent). Non-ASCII characters are written as-is.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), StorageError> {
    let body = serde_json::to_string_pretty(data).map_err(StorageError::Serialize)?;
    write_text(path, &body)
}

/// Writes PlantUML source, adding `@startuml`/`@enduml` unless both are present.
pub fn write_diagram_source(path: &Path, code: &str) -> Result<(), StorageError> {
    let code = code.trim();
    let content = if has_markers(code) {
        code.to_string()
    } else {
        format!("{START_MARKER}\n{code}\n{END_MARKER}")
    };
    write_text(path, &content)
}
