use thiserror::Error;
use uuid::Uuid;

use crate::models::activity::Activity;

/// Authoritative in-memory collection, kept in insertion order.
#[derive(Default, Debug)]
pub struct Store {
    pub activities: Vec<Activity>,
    /// Set when the last write to storage failed and memory is ahead of disk
    pub dirty: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum IdResolveError {
    #[error("No activity matches '{0}'")]
    NoMatch(String),

    #[error("'{}' matches several activities: {}", .0, .1.join(", "))]
    Ambiguous(String, Vec<String>),
}

impl Store {
    pub fn new(activities: Vec<Activity>) -> Self {
        Self {
            activities,
            dirty: false,
        }
    }

    pub fn get_activity(&self, id: Uuid) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    pub fn get_activity_mut(&mut self, id: Uuid) -> Option<&mut Activity> {
        self.activities.iter_mut().find(|a| a.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get_activity(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Resolves a full UUID or a unique prefix of one (as printed by the listing)
    pub fn resolve_id(&self, input: &str) -> Result<Uuid, IdResolveError> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return Err(IdResolveError::NoMatch(input.to_string()));
        }

        if let Ok(id) = Uuid::parse_str(&needle) {
            return if self.contains(id) {
                Ok(id)
            } else {
                Err(IdResolveError::NoMatch(input.to_string()))
            };
        }

        let matching: Vec<_> = self
            .activities
            .iter()
            .filter(|a| a.id.to_string().starts_with(&needle))
            .collect();

        match matching.len() {
            0 => Err(IdResolveError::NoMatch(input.to_string())),
            1 => Ok(matching[0].id),
            _ => {
                let titles = matching.iter().map(|a| a.title.clone()).collect();
                Err(IdResolveError::Ambiguous(input.to_string(), titles))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::{ActivityType, Priority};

    fn activity(id: &str, title: &str) -> Activity {
        Activity {
            id: Uuid::parse_str(id).unwrap(),
            title: title.to_string(),
            subject: String::new(),
            kind: ActivityType::Reading,
            difficulty: String::new(),
            estimated_time: 0.0,
            priority: Priority::Medium,
            deadline: String::new(),
            notes: String::new(),
            important: false,
            completed: false,
        }
    }

    fn sample_store() -> Store {
        Store::new(vec![
            activity("aa000000-0000-4000-8000-000000000001", "First"),
            activity("aa000000-0000-4000-8000-000000000002", "Second"),
            activity("bb000000-0000-4000-8000-000000000003", "Third"),
        ])
    }

    #[test]
    fn resolves_unique_prefix() {
        let store = sample_store();
        let id = store.resolve_id("bb").unwrap();
        assert_eq!(store.get_activity(id).unwrap().title, "Third");
    }

    #[test]
    fn resolves_full_uuid() {
        let store = sample_store();
        let id = store
            .resolve_id("AA000000-0000-4000-8000-000000000002")
            .unwrap();
        assert_eq!(store.get_activity(id).unwrap().title, "Second");
    }

    #[test]
    fn reports_ambiguous_prefix() {
        let store = sample_store();
        match store.resolve_id("aa") {
            Err(err @ IdResolveError::Ambiguous(..)) => {
                assert_eq!(
                    err.to_string(),
                    "'aa' matches several activities: First, Second"
                );
            }
            other => panic!("Expected ambiguous prefix, got {:?}", other),
        }
    }

    #[test]
    fn reports_unknown_id() {
        let store = sample_store();
        assert!(matches!(
            store.resolve_id("cc"),
            Err(IdResolveError::NoMatch(_))
        ));
        assert!(matches!(
            store.resolve_id("cc000000-0000-4000-8000-000000000009"),
            Err(IdResolveError::NoMatch(_))
        ));
        assert!(matches!(store.resolve_id("  "), Err(IdResolveError::NoMatch(_))));
    }
}
