use crate::errors::StorageError;
use crate::storage::artifacts::ensure_directory;
use std::path::{Path, PathBuf};

const RUN_PREFIX: &str = "run_";

/// `0.3` -> `temp_0_3`, `1.0` -> `temp_1_0`.
pub fn temperature_dir_name(temperature: f64) -> String {
    // Debug keeps the trailing `.0` on whole numbers.
    format!("temp_{}", format!("{:?}", temperature).replace('.', "_"))
}

pub fn run_dir_name(number: u64) -> String {
    format!("{RUN_PREFIX}{number:02}")
}

/// `base/<prompt>/<model>/temp_<T>`, not created.
pub fn series_dir(base_dir: &Path, prompt_name: &str, model_name: &str, temperature: f64) -> PathBuf {
    base_dir
        .join(prompt_name)
        .join(model_name)
        .join(temperature_dir_name(temperature))
}

/// Parses `run_07` -> 7. Anything else (`run_x`, `run_`, `notes`) -> None.
fn parse_run_number(name: &str) -> Option<u64> {
    if !name.starts_with(RUN_PREFIX) {
        return None;
    }
    name.split('_').nth(1)?.parse().ok()
}

/// Highest `run_N` among the direct child directories of `dir`.
pub fn max_run_number(dir: &Path) -> Result<Option<u64>, StorageError> {
    let entries = std::fs::read_dir(dir).map_err(|e| StorageError::io(dir, e))?;

    let mut max = None;
    for entry in entries {
        let entry = entry.map_err(|e| StorageError::io(dir, e))?;
        // Follows symlinks, so a linked run directory still counts.
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(n) = entry.file_name().to_str().and_then(parse_run_number) {
            max = max.max(Some(n));
        }
    }
    Ok(max)
}

/// Creates the next `run_NN` directory for a prompt/model/temperature series.
///
/// Numbering is one past the highest existing run, so deleting an old run
/// never causes a newer one to be reused. Assumes a single writer per
/// series: if the chosen name appears between the scan and the create,
/// this fails with [`StorageError::DirectoryCollision`].
pub fn allocate(
    base_dir: &Path,
    prompt_name: &str,
    model_name: &str,
    temperature: f64,
) -> Result<PathBuf, StorageError> {
    ensure_directory(base_dir)?;
    let series = series_dir(base_dir, prompt_name, model_name, temperature);
    std::fs::create_dir_all(&series).map_err(|e| StorageError::io(&series, e))?;

    let next = match max_run_number(&series)? {
        None => 1,
        Some(n) => n
            .checked_add(1)
            .ok_or_else(|| StorageError::RunNumbersExhausted {
                series: series.clone(),
                number: n,
            })?,
    };
    let run_dir = series.join(run_dir_name(next));

    match std::fs::create_dir(&run_dir) {
        Ok(()) => Ok(run_dir),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            Err(StorageError::DirectoryCollision(run_dir))
        }
        Err(e) => Err(StorageError::io(&run_dir, e)),
    }
}
