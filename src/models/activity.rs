use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// UUID to identify the activity, never reassigned
    pub id: Uuid,
    /// Title of the activity
    pub title: String,
    /// Subject the activity belongs to
    #[serde(default)]
    pub subject: String,
    /// Kind of study work
    #[serde(rename = "type")]
    pub kind: ActivityType,
    /// Free-form difficulty label
    #[serde(default)]
    pub difficulty: String,
    /// Estimated time in hours
    #[serde(default)]
    pub estimated_time: f64,
    pub priority: Priority,
    /// Deadline as a date string, empty when there is none
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub notes: String,
    /// Highlighted in listings
    #[serde(default)]
    pub important: bool,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    #[default]
    Reading,
    Practice,
    Project,
    Evaluation,
}

impl ActivityType {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityType::Reading => "Reading",
            ActivityType::Practice => "Practice / exercises",
            ActivityType::Project => "Project",
            ActivityType::Evaluation => "Evaluation / exam",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown activity type '{0}' (expected reading, practice, project or evaluation)")]
pub struct UnknownActivityType(String);

impl FromStr for ActivityType {
    type Err = UnknownActivityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reading" => Ok(ActivityType::Reading),
            "practice" => Ok(ActivityType::Practice),
            "project" => Ok(ActivityType::Project),
            "evaluation" => Ok(ActivityType::Evaluation),
            _ => Err(UnknownActivityType(s.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Sort rank, lower comes first
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        };
        f.write_str(label)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown priority '{0}' (expected high, medium or low)")]
pub struct UnknownPriority(String);

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(UnknownPriority(s.to_string())),
        }
    }
}

/// User-supplied values for a new activity.
#[derive(Debug, Clone, Default)]
pub struct ActivityDraft {
    pub title: String,
    pub subject: String,
    pub kind: ActivityType,
    pub difficulty: String,
    /// Absent means zero
    pub estimated_time: Option<f64>,
    pub priority: Priority,
    pub deadline: String,
    pub notes: String,
    pub important: bool,
}

/// Fields the edit flow is allowed to replace. Everything else on the record
/// is left as it was.
#[derive(Debug, Clone, Default)]
pub struct ActivityPatch {
    pub title: String,
    pub subject: String,
    pub kind: ActivityType,
    pub deadline: String,
}

impl ActivityPatch {
    /// Starts a patch from the current values of a record.
    pub fn from_activity(activity: &Activity) -> Self {
        Self {
            title: activity.title.clone(),
            subject: activity.subject.clone(),
            kind: activity.kind,
            deadline: activity.deadline.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_record_with_missing_optional_fields() {
        let json = r#"{
            "id": "5f0c6c1e-8d0b-4a57-9d0e-0d7f4a1c2b3e",
            "title": "Read ch.1",
            "type": "reading",
            "priority": "high"
        }"#;

        let activity: Activity = serde_json::from_str(json).unwrap();

        assert_eq!(activity.title, "Read ch.1");
        assert_eq!(activity.kind, ActivityType::Reading);
        assert_eq!(activity.priority, Priority::High);
        assert_eq!(activity.estimated_time, 0.0);
        assert_eq!(activity.deadline, "");
        assert!(!activity.completed);
        assert!(!activity.important);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let activity = Activity {
            id: Uuid::nil(),
            title: String::from("Essay"),
            subject: String::from("History"),
            kind: ActivityType::Project,
            difficulty: String::from("hard"),
            estimated_time: 2.5,
            priority: Priority::Low,
            deadline: String::from("2026-11-02"),
            notes: String::new(),
            important: true,
            completed: false,
        };

        let value = serde_json::to_value(&activity).unwrap();

        assert_eq!(value["type"], "project");
        assert_eq!(value["estimatedTime"], 2.5);
        assert_eq!(value["priority"], "low");
        assert_eq!(value["important"], true);
    }

    #[test]
    fn parses_enums_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" Practice ".parse::<ActivityType>().unwrap(), ActivityType::Practice);
        assert!("urgent".parse::<Priority>().is_err());
        assert!("lecture".parse::<ActivityType>().is_err());
    }

    #[test]
    fn priority_rank_orders_high_first() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
    }
}
