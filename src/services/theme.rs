use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::{KeyValueStore, StorageError, THEME_KEY};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored as a JSON string. A bare `light` is accepted too; anything else
/// means dark.
pub fn load_theme(storage: &impl KeyValueStore) -> Theme {
    match storage.get(THEME_KEY) {
        Ok(Some(value)) => serde_json::from_str::<Theme>(&value).unwrap_or_else(|_| {
            if value.trim() == Theme::Light.as_str() {
                Theme::Light
            } else {
                Theme::Dark
            }
        }),
        Ok(None) => Theme::Dark,
        Err(e) => {
            warn!(error = %e, "failed to read theme, using dark");
            Theme::Dark
        }
    }
}

pub fn save_theme(storage: &impl KeyValueStore, theme: Theme) -> Result<(), StorageError> {
    let json = serde_json::to_string(&theme).map_err(|e| StorageError::SerializeFailed {
        key: THEME_KEY.to_string(),
        source: e,
    })?;
    storage.set(THEME_KEY, &json)
}
