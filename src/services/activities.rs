use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    models::{
        activity::{Activity, ActivityDraft, ActivityPatch},
        store::Store,
    },
    services::ids::IdGenerator,
    storage::{ACTIVITIES_KEY, KeyValueStore, StorageError},
};

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("title required")]
    TitleRequired,

    #[error("invalid time")]
    InvalidTime,
}

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Activity '{0}' not found")]
    NotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Reads the persisted collection. Missing, unreadable or corrupt data yields
/// an empty store; this never fails.
pub fn load_store(storage: &impl KeyValueStore) -> Store {
    let content = match storage.get(ACTIVITIES_KEY) {
        Ok(Some(content)) => content,
        Ok(None) => {
            debug!("no persisted activities, starting empty");
            return Store::default();
        }
        Err(e) => {
            warn!(error = %e, "failed to read activities, starting empty");
            return Store::default();
        }
    };

    match serde_json::from_str::<Vec<Activity>>(&content) {
        Ok(activities) => {
            debug!(count = activities.len(), "loaded activities");
            Store::new(activities)
        }
        Err(e) => {
            warn!(error = %e, "persisted activities are corrupt, starting empty");
            Store::default()
        }
    }
}

/// Writes the whole collection. On failure memory is kept as is and the
/// store is marked dirty so a later `flush` can retry.
fn persist(store: &mut Store, storage: &impl KeyValueStore) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(&store.activities).map_err(|e| {
        StorageError::SerializeFailed {
            key: ACTIVITIES_KEY.to_string(),
            source: e,
        }
    })?;

    match storage.set(ACTIVITIES_KEY, &json) {
        Ok(()) => {
            store.dirty = false;
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "failed to persist activities, keeping in-memory state");
            store.dirty = true;
            Err(e)
        }
    }
}

/// Retries a write that failed earlier. No-op when memory and storage agree.
pub fn flush(store: &mut Store, storage: &impl KeyValueStore) -> Result<(), StorageError> {
    if !store.dirty {
        return Ok(());
    }
    persist(store, storage)
}

fn validate_draft(draft: &ActivityDraft) -> Result<(String, f64), ValidationError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(ValidationError::TitleRequired);
    }

    let estimated_time = draft.estimated_time.unwrap_or(0.0);
    if !estimated_time.is_finite() || estimated_time < 0.0 {
        return Err(ValidationError::InvalidTime);
    }

    Ok((title.to_string(), estimated_time))
}

pub fn add_activity(
    store: &mut Store,
    storage: &impl KeyValueStore,
    ids: &mut impl IdGenerator,
    draft: ActivityDraft,
) -> Result<Activity, ActivityError> {
    let (title, estimated_time) = validate_draft(&draft)?;

    // A generator may hand out an id already in the collection
    let mut id = ids.next_id();
    while store.contains(id) {
        id = ids.next_id();
    }

    let activity = Activity {
        id,
        title,
        subject: draft.subject,
        kind: draft.kind,
        difficulty: draft.difficulty,
        estimated_time,
        priority: draft.priority,
        deadline: draft.deadline,
        notes: draft.notes,
        important: draft.important,
        completed: false,
    };

    store.activities.push(activity.clone());
    debug!(%id, title = %activity.title, "added activity");

    persist(store, storage)?;

    Ok(activity)
}

pub fn toggle_completed(
    store: &mut Store,
    storage: &impl KeyValueStore,
    id: Uuid,
) -> Result<Activity, ActivityError> {
    let activity = store
        .get_activity_mut(id)
        .ok_or(ActivityError::NotFound(id))?;
    activity.completed = !activity.completed;
    let toggled = activity.clone();
    debug!(%id, completed = toggled.completed, "toggled activity");

    persist(store, storage)?;

    Ok(toggled)
}

/// Replaces title, subject, type and deadline. The title is trimmed but not
/// re-validated.
pub fn update_activity(
    store: &mut Store,
    storage: &impl KeyValueStore,
    id: Uuid,
    patch: ActivityPatch,
) -> Result<Activity, ActivityError> {
    let activity = store
        .get_activity_mut(id)
        .ok_or(ActivityError::NotFound(id))?;
    activity.title = patch.title.trim().to_string();
    activity.subject = patch.subject;
    activity.kind = patch.kind;
    activity.deadline = patch.deadline;
    let updated = activity.clone();
    debug!(%id, "updated activity");

    persist(store, storage)?;

    Ok(updated)
}

/// Removes the record if present. Removing an unknown id is a no-op that
/// returns `None` and does not touch storage.
pub fn remove_activity(
    store: &mut Store,
    storage: &impl KeyValueStore,
    id: Uuid,
) -> Result<Option<Activity>, ActivityError> {
    let Some(index) = store.activities.iter().position(|a| a.id == id) else {
        debug!(%id, "remove of unknown activity ignored");
        return Ok(None);
    };

    let removed = store.activities.remove(index);
    debug!(%id, "removed activity");

    persist(store, storage)?;

    Ok(Some(removed))
}
