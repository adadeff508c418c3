use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::{
    models::{
        activity::{Activity, ActivityDraft, ActivityPatch},
        store::{IdResolveError, Store},
        view::{SortKey, StatusFilter, ViewState},
    },
    services::{
        activities::{
            ActivityError, add_activity, flush, load_store, remove_activity, toggle_completed,
            update_activity,
        },
        ids::IdGenerator,
        stats::{Stats, compute_stats},
        theme::{Theme, load_theme, save_theme},
        view::visible_activities,
    },
    storage::{KeyValueStore, StorageError},
};

/// Everything a user action can ask for.
#[derive(Debug, Clone)]
pub enum Command {
    Add(ActivityDraft),
    ToggleCompleted(Uuid),
    Update(Uuid, ActivityPatch),
    Remove(Uuid),
    SetStatusFilter(StatusFilter),
    SetSearchQuery(String),
    SetSortKey(SortKey),
    ToggleTheme,
    SetTheme(Theme),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Added(Activity),
    Toggled(Activity),
    Updated(Activity),
    Removed(Option<Activity>),
    ViewChanged,
    ThemeChanged(Theme),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Activity(#[from] ActivityError),

    /// The change is applied in memory but the write failed; `flush` retries it
    #[error("Change applied but not saved: {source}")]
    Unsaved {
        outcome: Outcome,
        #[source]
        source: StorageError,
    },

    #[error("Failed to save theme: {0}")]
    Theme(#[source] StorageError),
}

fn unsaved(outcome: Option<Outcome>, source: StorageError) -> SessionError {
    match outcome {
        Some(outcome) => SessionError::Unsaved { outcome, source },
        None => SessionError::Activity(ActivityError::Storage(source)),
    }
}

/// Application state held explicitly: the collection, the view-state, the
/// theme and the collaborators they are persisted and identified through.
pub struct Session<S: KeyValueStore, G: IdGenerator> {
    store: Store,
    view: ViewState,
    theme: Theme,
    storage: S,
    ids: G,
}

impl<S: KeyValueStore, G: IdGenerator> Session<S, G> {
    pub fn open(storage: S, ids: G) -> Self {
        let store = load_store(&storage);
        let theme = load_theme(&storage);
        debug!(activities = store.len(), %theme, "session opened");
        Self {
            store,
            view: ViewState::default(),
            theme,
            storage,
            ids,
        }
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Outcome, SessionError> {
        let outcome = match command {
            Command::Add(draft) => {
                match add_activity(&mut self.store, &self.storage, &mut self.ids, draft) {
                    Ok(activity) => Outcome::Added(activity),
                    Err(ActivityError::Storage(source)) => {
                        let applied = self.store.activities.last().cloned();
                        return Err(unsaved(applied.map(Outcome::Added), source));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Command::ToggleCompleted(id) => {
                match toggle_completed(&mut self.store, &self.storage, id) {
                    Ok(activity) => Outcome::Toggled(activity),
                    Err(ActivityError::Storage(source)) => {
                        let applied = self.store.get_activity(id).cloned();
                        return Err(unsaved(applied.map(Outcome::Toggled), source));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Command::Update(id, patch) => {
                match update_activity(&mut self.store, &self.storage, id, patch) {
                    Ok(activity) => Outcome::Updated(activity),
                    Err(ActivityError::Storage(source)) => {
                        let applied = self.store.get_activity(id).cloned();
                        return Err(unsaved(applied.map(Outcome::Updated), source));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Command::Remove(id) => {
                let existing = self.store.get_activity(id).cloned();
                match remove_activity(&mut self.store, &self.storage, id) {
                    Ok(removed) => Outcome::Removed(removed),
                    Err(ActivityError::Storage(source)) => {
                        return Err(unsaved(Some(Outcome::Removed(existing)), source));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Command::SetStatusFilter(filter) => {
                self.view.status_filter = filter;
                Outcome::ViewChanged
            }
            Command::SetSearchQuery(query) => {
                self.view.search_query = query;
                Outcome::ViewChanged
            }
            Command::SetSortKey(key) => {
                self.view.sort_key = key;
                Outcome::ViewChanged
            }
            Command::ToggleTheme => self.apply_theme(self.theme.toggled())?,
            Command::SetTheme(theme) => self.apply_theme(theme)?,
        };
        Ok(outcome)
    }

    fn apply_theme(&mut self, theme: Theme) -> Result<Outcome, SessionError> {
        save_theme(&self.storage, theme).map_err(SessionError::Theme)?;
        self.theme = theme;
        Ok(Outcome::ThemeChanged(theme))
    }

    /// The records to render for the current view-state
    pub fn visible(&self) -> Vec<&Activity> {
        visible_activities(&self.store.activities, &self.view)
    }

    pub fn stats(&self) -> Stats {
        compute_stats(&self.store.activities)
    }

    pub fn resolve_id(&self, input: &str) -> Result<Uuid, IdResolveError> {
        self.store.resolve_id(input)
    }

    pub fn get(&self, id: Uuid) -> Option<&Activity> {
        self.store.get_activity(id)
    }

    /// Retries a collection write that failed earlier
    pub fn flush(&mut self) -> Result<(), StorageError> {
        flush(&mut self.store, &self.storage)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.store.dirty
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::activity::{ActivityType, Priority},
        services::ids::SequentialIds,
        storage::memory::MemoryStorage,
    };

    fn draft(title: &str, priority: Priority) -> ActivityDraft {
        ActivityDraft {
            title: title.to_string(),
            priority,
            kind: ActivityType::Reading,
            ..ActivityDraft::default()
        }
    }

    fn session() -> Session<MemoryStorage, SequentialIds> {
        Session::open(MemoryStorage::new(), SequentialIds::default())
    }

    fn added(outcome: Outcome) -> Activity {
        match outcome {
            Outcome::Added(activity) => activity,
            other => panic!("Expected Added, got {:?}", other),
        }
    }

    fn visible_titles(session: &Session<MemoryStorage, SequentialIds>) -> Vec<String> {
        session.visible().iter().map(|a| a.title.clone()).collect()
    }

    #[test]
    fn mutations_are_visible_immediately() {
        let mut session = session();
        let read = added(
            session
                .dispatch(Command::Add(draft("Read ch.1", Priority::High)))
                .unwrap(),
        );
        let essay = added(
            session
                .dispatch(Command::Add(draft("Essay", Priority::Low)))
                .unwrap(),
        );
        session
            .dispatch(Command::ToggleCompleted(essay.id))
            .unwrap();

        session
            .dispatch(Command::SetStatusFilter(StatusFilter::Pending))
            .unwrap();
        assert_eq!(visible_titles(&session), vec!["Read ch.1"]);

        session.dispatch(Command::Remove(read.id)).unwrap();
        assert!(session.visible().is_empty());
    }

    #[test]
    fn view_state_combines_filter_search_and_sort() {
        let mut session = session();
        for (title, priority) in [
            ("B reading", Priority::High),
            ("A reading", Priority::Low),
            ("Essay", Priority::High),
        ] {
            session.dispatch(Command::Add(draft(title, priority))).unwrap();
        }

        session
            .dispatch(Command::SetSearchQuery(String::from("READING")))
            .unwrap();
        session
            .dispatch(Command::SetSortKey(SortKey::Priority))
            .unwrap();
        assert_eq!(visible_titles(&session), vec!["B reading", "A reading"]);

        session.dispatch(Command::SetSortKey(SortKey::Title)).unwrap();
        assert_eq!(visible_titles(&session), vec!["A reading", "B reading"]);
        assert_eq!(session.view().search_query, "READING");
    }

    #[test]
    fn validation_error_surfaces_without_mutation() {
        let mut session = session();

        let result = session.dispatch(Command::Add(draft("", Priority::High)));

        assert!(matches!(
            result,
            Err(SessionError::Activity(ActivityError::Validation(_)))
        ));
        assert!(session.store.is_empty());
    }

    #[test]
    fn stale_id_is_reported() {
        let mut session = session();
        let activity = added(
            session
                .dispatch(Command::Add(draft("Read", Priority::Medium)))
                .unwrap(),
        );
        session.dispatch(Command::Remove(activity.id)).unwrap();

        let result = session.dispatch(Command::ToggleCompleted(activity.id));

        assert!(matches!(
            result,
            Err(SessionError::Activity(ActivityError::NotFound(_)))
        ));
        assert_eq!(
            session.dispatch(Command::Remove(activity.id)).unwrap(),
            Outcome::Removed(None)
        );
    }

    #[test]
    fn state_survives_reopening() {
        let storage = MemoryStorage::new();
        let mut session = Session::open(storage, SequentialIds::default());
        let activity = added(
            session
                .dispatch(Command::Add(draft("Read", Priority::Medium)))
                .unwrap(),
        );
        session.dispatch(Command::ToggleTheme).unwrap();
        let Session { storage, .. } = session;

        let reopened = Session::open(storage, SequentialIds::default());

        assert_eq!(reopened.theme(), Theme::Light);
        assert_eq!(reopened.get(activity.id), Some(&activity));
        assert_eq!(reopened.view(), &ViewState::default());
    }

    #[test]
    fn theme_toggles_between_dark_and_light() {
        let mut session = session();
        assert_eq!(session.theme(), Theme::Dark);

        assert_eq!(
            session.dispatch(Command::ToggleTheme).unwrap(),
            Outcome::ThemeChanged(Theme::Light)
        );
        assert_eq!(
            session.dispatch(Command::SetTheme(Theme::Dark)).unwrap(),
            Outcome::ThemeChanged(Theme::Dark)
        );
    }

    #[test]
    fn failed_theme_write_keeps_previous_theme() {
        let storage = MemoryStorage::new();
        storage.set_fail_writes(true);
        let mut session = Session::open(storage, SequentialIds::default());

        let result = session.dispatch(Command::ToggleTheme);

        assert!(matches!(result, Err(SessionError::Theme(_))));
        assert_eq!(session.theme(), Theme::Dark);
    }

    #[test]
    fn failed_write_is_flushed_later() {
        let mut session = session();
        session.storage.set_fail_writes(true);

        let result = session.dispatch(Command::Add(draft("Read", Priority::Medium)));

        match result {
            Err(SessionError::Unsaved {
                outcome: Outcome::Added(activity),
                ..
            }) => assert_eq!(activity.title, "Read"),
            other => panic!("Expected unsaved Added outcome, got {:?}", other),
        }
        assert!(session.has_unsaved_changes());
        assert_eq!(visible_titles(&session), vec!["Read"]);

        session.storage.set_fail_writes(false);
        session.flush().unwrap();
        assert!(!session.has_unsaved_changes());
    }

    #[test]
    fn failed_remove_still_reports_removed_record() {
        let mut session = session();
        let activity = added(
            session
                .dispatch(Command::Add(draft("Essay", Priority::Low)))
                .unwrap(),
        );
        session.storage.set_fail_writes(true);

        let result = session.dispatch(Command::Remove(activity.id));

        match result {
            Err(SessionError::Unsaved { outcome, .. }) => {
                assert_eq!(outcome, Outcome::Removed(Some(activity)));
            }
            other => panic!("Expected unsaved Removed outcome, got {:?}", other),
        }
        assert!(session.visible().is_empty());
    }

    #[test]
    fn failed_toggle_reports_new_state() {
        let mut session = session();
        let activity = added(
            session
                .dispatch(Command::Add(draft("Read", Priority::High)))
                .unwrap(),
        );
        session.storage.set_fail_writes(true);

        match session.dispatch(Command::ToggleCompleted(activity.id)) {
            Err(SessionError::Unsaved {
                outcome: Outcome::Toggled(toggled),
                ..
            }) => assert!(toggled.completed),
            other => panic!("Expected unsaved Toggled outcome, got {:?}", other),
        }
    }

    #[test]
    fn stats_cover_whole_collection() {
        let mut session = session();
        let read = added(
            session
                .dispatch(Command::Add(draft("Read", Priority::Medium)))
                .unwrap(),
        );
        session
            .dispatch(Command::Add(draft("Essay", Priority::Medium)))
            .unwrap();
        session.dispatch(Command::ToggleCompleted(read.id)).unwrap();
        session
            .dispatch(Command::SetStatusFilter(StatusFilter::Completed))
            .unwrap();

        let stats = session.stats();

        assert_eq!(stats.total, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 1);
    }
}
