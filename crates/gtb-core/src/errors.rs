use std::path::PathBuf;

/// Core error type for the bot.
///
/// Adapter crates map their specific errors into this type so the controller
/// can decide what the user sees (generic failure notice vs. silent skip).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("roster file is corrupt: {path}: {source}")]
    StorageCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("roster file does not exist: {0}")]
    MissingRoster(PathBuf),

    #[error("not a backup file name: {0}")]
    InvalidBackupName(String),

    #[error("backup not found: {0}")]
    BackupNotFound(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
