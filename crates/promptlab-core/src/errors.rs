use std::path::PathBuf;

/// Invalid or unreadable configuration. Always maps to exit code 2 in the CLI.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(pub String);

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The run directory we were about to create already exists.
    ///
    /// Only happens when two writers allocate against the same
    /// prompt/model/temperature directory at once.
    #[error("run directory already exists: {}", .0.display())]
    DirectoryCollision(PathBuf),

    /// The highest existing run number cannot be incremented.
    #[error("no run number left after {} in {}", .number, .series.display())]
    RunNumbersExhausted { series: PathBuf, number: u64 },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize artifact: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Returns the collision path if `err` (or anything in its chain) is a
/// [`StorageError::DirectoryCollision`].
pub fn as_collision(err: &anyhow::Error) -> Option<&PathBuf> {
    err.chain().find_map(|e| match e.downcast_ref::<StorageError>() {
        Some(StorageError::DirectoryCollision(p)) => Some(p),
        _ => None,
    })
}
