use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An append-only log entry describing something that happened on a project.
///
/// `metadata` carries a structured payload whose shape depends on
/// `activity_type` (for example the old and new task status).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub project_id: Uuid,
    pub activity_type: ActivityType,
    pub description: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    /// A task's status changed and progress was recomputed.
    TaskStatusChange,
    /// The project moved into its next lifecycle phase.
    PhaseAdvanced,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskStatusChange => "task_status_change",
            Self::PhaseAdvanced => "phase_advanced",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "task_status_change" => Some(Self::TaskStatusChange),
            "phase_advanced" => Some(Self::PhaseAdvanced),
            _ => None,
        }
    }
}

/// Input for appending an activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActivityInput {
    pub project_id: Uuid,
    pub activity_type: ActivityType,
    pub description: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}
