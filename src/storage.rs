use std::path::PathBuf;

use thiserror::Error;

pub mod json;
pub mod memory;

/// Key holding the serialized activity collection
pub const ACTIVITIES_KEY: &str = "activities";
/// Key holding the display theme preference
pub const THEME_KEY: &str = "theme";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read '{path}': {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize '{key}' to JSON: {source}")]
    SerializeFailed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to create backup at '{path}': {source}")]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to cleanup old backups in '{dir}': {source}")]
    CleanupFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Persistence boundary: a flat text key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
