use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::phase::Phase;

/// An append-only snapshot of a project's overall progress.
///
/// One entry is written every time progress is recomputed and persisted;
/// entries are never updated or deleted, so they form an audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub id: Uuid,
    pub project_id: Uuid,
    pub progress_percentage: u8,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a phase advancement check.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdvanceOutcome {
    pub advanced: bool,
    pub new_phase: Option<Phase>,
}

impl AdvanceOutcome {
    pub fn stayed() -> Self {
        Self::default()
    }

    pub fn advanced_to(phase: Phase) -> Self {
        Self {
            advanced: true,
            new_phase: Some(phase),
        }
    }
}

/// Result of a full progress sync for one project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncReport {
    pub project_id: Uuid,
    pub progress: u8,
    pub advanced: bool,
    pub new_phase: Option<Phase>,
    /// Whether this sync flipped the project's status to `completed`.
    pub completed: bool,
}
