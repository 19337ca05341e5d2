use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::phase::Phase;

/// A construction project.
///
/// Projects are created by users; after that, `current_phase`,
/// `progress_percentage` and (on completion) `status` are maintained by
/// [`crate::progress::ProgressSync`] as tasks change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub current_phase: Phase,
    /// Overall completion, 0 to 100.
    pub progress_percentage: u8,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The administrative status of a project.
///
/// - `Planning`: Not yet started on site
/// - `Active`: Work is underway
/// - `OnHold`: Paused
/// - `Completed`: Finished (set automatically when progress reaches 100)
/// - `Cancelled`: Abandoned
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Active => "active",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "planning" => Some(Self::Planning),
            "active" => Some(Self::Active),
            "on_hold" => Some(Self::OnHold),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Input for creating a new project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectInput {
    pub name: String,
    pub description: Option<String>,
    /// Starting phase. Defaults to `Concept`.
    #[serde(default)]
    pub current_phase: Option<Phase>,
    /// Initial status. Defaults to `Planning`.
    #[serde(default)]
    pub status: Option<ProjectStatus>,
}

/// Input for updating an existing project. All fields are optional for partial updates.
///
/// Progress is not editable here; it is derived from tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProjectInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub current_phase: Option<Phase>,
    pub status: Option<ProjectStatus>,
}

/// Snapshot of a project's progress as shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectProgress {
    pub project_id: Uuid,
    pub current_phase: Phase,
    /// Completion of the current phase only.
    pub phase_progress: u8,
    /// Overall completion across all phases.
    pub progress: u8,
}
