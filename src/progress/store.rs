use anyhow::Result;
use uuid::Uuid;

use crate::models::{
    Activity, CreateActivityInput, Phase, ProgressEntry, Project, ProjectStatus, Task,
};

/// The rows the progress core reads and writes.
///
/// [`crate::db::Database`] is the production implementation. Every call is
/// an independent statement; nothing here is transactional, so concurrent
/// writers to the same project are last-write-wins.
pub trait ProgressStore {
    fn get_project(&self, id: Uuid) -> Result<Option<Project>>;

    /// Tasks with `project_id == project_id AND phase == phase`.
    fn get_tasks_by_phase(&self, project_id: Uuid, phase: Phase) -> Result<Vec<Task>>;

    fn set_current_phase(&self, project_id: Uuid, phase: Phase) -> Result<()>;

    fn set_progress_percentage(&self, project_id: Uuid, progress: u8) -> Result<()>;

    fn set_project_status(&self, project_id: Uuid, status: ProjectStatus) -> Result<()>;

    fn create_progress_entry(&self, project_id: Uuid, progress: u8) -> Result<ProgressEntry>;

    fn create_activity(&self, input: CreateActivityInput) -> Result<Activity>;
}
