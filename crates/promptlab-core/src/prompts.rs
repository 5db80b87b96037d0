use crate::model::Prompt;
use anyhow::Context;
use std::path::Path;

/// Loads every `*.txt` file directly inside `dir`, sorted by file name.
///
/// The file stem becomes the prompt name and the trimmed contents its text.
pub fn load_prompts(dir: &Path) -> anyhow::Result<Vec<Prompt>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read prompt directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_txt = path.extension().is_some_and(|e| e == "txt");
        if is_txt && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut prompts = Vec::with_capacity(files.len());
    for path in files {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            tracing::warn!(path = %path.display(), "skipping prompt with non UTF-8 file name");
            continue;
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read prompt {}", path.display()))?;
        prompts.push(Prompt {
            name: name.to_string(),
            text: text.trim().to_string(),
        });
    }
    Ok(prompts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_sorted_trimmed_txt_only() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join("B_SEQ.txt"), "\n  Draw a sequence diagram.  \n").unwrap();
        std::fs::write(tmp.path().join("A_CLASS.txt"), "Draw a class diagram.").unwrap();
        std::fs::write(tmp.path().join("notes.md"), "ignored").unwrap();
        std::fs::create_dir(tmp.path().join("nested.txt")).unwrap();

        let prompts = load_prompts(tmp.path()).unwrap();
        let names: Vec<_> = prompts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["A_CLASS", "B_SEQ"]);
        assert_eq!(prompts[1].text, "Draw a sequence diagram.");
    }

    #[test]
    fn test_missing_dir_is_error() {
        let tmp = tempdir().unwrap();
        let err = load_prompts(&tmp.path().join("nope")).unwrap_err();
        assert!(err.to_string().contains("failed to read prompt directory"));
    }
}
