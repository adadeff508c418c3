use std::{
    fs::{self, OpenOptions, rename, write},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::storage::{KeyValueStore, StorageError};

/// Number of backups kept per key
const MAX_BACKUPS: usize = 5;

/// Stores each key as `<dir>/<key>.json`.
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn create_backup(&self, key: &str, path: &Path) -> Result<u64, StorageError> {
        let file_exists = fs::exists(path).map_err(|e| StorageError::BackupFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        if !file_exists {
            return Ok(0);
        }

        let backups_dir = self.get_backup_dir();
        fs::create_dir_all(&backups_dir).map_err(|e| StorageError::BackupFailed {
            path: backups_dir.clone(),
            source: e,
        })?;

        let backup_path = self.get_backup_path(key);
        fs::copy(path, &backup_path).map_err(|e| StorageError::BackupFailed {
            path: backup_path,
            source: e,
        })
    }

    fn cleanup_old_backups(&self, key: &str) -> Result<(), StorageError> {
        let backup_dir = self.get_backup_dir();
        let backup_dir_exists =
            fs::exists(&backup_dir).map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?;
        if !backup_dir_exists {
            return Ok(());
        }

        let prefix = Self::backup_prefix(key);
        let mut file_entries = fs::read_dir(&backup_dir)
            .map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?
            .flatten()
            .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
            .map(|entry| entry.path())
            .collect::<Vec<_>>();

        // Timestamps in the names sort chronologically
        file_entries.sort();

        let number_of_files_to_delete = file_entries.len().saturating_sub(MAX_BACKUPS);
        for file_path in &file_entries[0..number_of_files_to_delete] {
            fs::remove_file(file_path).map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?;
        }

        Ok(())
    }

    /// Swaps the written temp file in under the lock, backing up the old one.
    fn replace_with_temp(
        &self,
        key: &str,
        path: &Path,
        temp_path: &Path,
    ) -> Result<(), StorageError> {
        let lock_file_path = path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_file_path)
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path.clone(),
                source: e,
            })?;
        lock_file
            .lock_exclusive()
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path,
                source: e,
            })?;

        self.create_backup(key, path)?;
        self.cleanup_old_backups(key)?;

        rename(temp_path, path).map_err(|e| StorageError::SaveFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        lock_file.unlock().map_err(|e| StorageError::SaveFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    fn get_backup_dir(&self) -> PathBuf {
        self.dir.join("backups")
    }

    fn backup_prefix(key: &str) -> String {
        format!("{}.json-", key)
    }

    fn get_backup_path(&self, key: &str) -> PathBuf {
        let now = jiff::Timestamp::now();
        let filename = format!(
            "{}{}-{:09}",
            Self::backup_prefix(key),
            now.strftime("%Y%m%dT%H%M%SZ"),
            now.subsec_nanosecond()
        );
        self.get_backup_dir().join(filename)
    }
}

impl KeyValueStore for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::LoadFailed { path, source: e }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;

        let temp_path = PathBuf::from(format!("{}.tmp.{}", path.display(), Uuid::new_v4()));
        write(&temp_path, value).map_err(|e| StorageError::SaveFailed {
            path: temp_path.clone(),
            source: e,
        })?;

        if let Err(e) = self.replace_with_temp(key, &path, &temp_path) {
            match fs::remove_file(&temp_path) {
                Err(cleanup) if cleanup.kind() != std::io::ErrorKind::NotFound => {
                    warn!(path = %temp_path.display(), error = %cleanup, "failed to remove temp file");
                }
                _ => {}
            }
            return Err(e);
        }

        debug!(key, path = %path.display(), bytes = value.len(), "wrote key");
        Ok(())
    }
}
