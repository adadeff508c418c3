use std::{cell::RefCell, collections::HashMap};

use crate::storage::{KeyValueStore, StorageError};

/// Volatile backend, used for `--ephemeral` runs and in tests.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
    fail_writes: RefCell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    /// Makes every following `set` fail until turned off again
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.borrow_mut() = fail;
    }

    #[cfg(test)]
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if *self.fail_writes.borrow() {
            return Err(StorageError::Unavailable(format!(
                "writes to '{}' are disabled",
                key
            )));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
