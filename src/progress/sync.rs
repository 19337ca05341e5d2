//! Progress service: recompute, advance, persist, notify.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::error::ProgressError;
use crate::models::*;

use super::calculator;
use super::catalog::PhaseCatalog;
use super::notify::{ProgressEvent, ProgressNotifier, Subscription};
use super::store::ProgressStore;

/// Derives project progress and phase from task state.
///
/// Every operation has a `try_*` form that reports failures, and an entry
/// point that logs the failure and falls back to a safe default (0, or "not
/// advanced") so a progress display never fails because the store did.
///
/// Nothing here locks the project row. Two status changes racing on the same
/// project may both read the same phase; the later write wins.
#[derive(Clone)]
pub struct ProgressSync<S> {
    store: S,
    catalog: Arc<PhaseCatalog>,
    notifier: ProgressNotifier,
}

impl<S: ProgressStore> ProgressSync<S> {
    pub fn new(store: S, catalog: PhaseCatalog) -> Self {
        Self {
            store,
            catalog: Arc::new(catalog),
            notifier: ProgressNotifier::new(),
        }
    }

    pub fn catalog(&self) -> &PhaseCatalog {
        &self.catalog
    }

    pub fn notifier(&self) -> &ProgressNotifier {
        &self.notifier
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registers a listener for persisted progress changes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ProgressEvent) + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener)
    }

    fn load_project(&self, project_id: Uuid) -> Result<Project, ProgressError> {
        self.store
            .get_project(project_id)?
            .ok_or(ProgressError::ProjectNotFound(project_id))
    }

    // ============================================================
    // Phase progress
    // ============================================================

    pub fn try_phase_progress(&self, project_id: Uuid, phase: Phase) -> Result<u8, ProgressError> {
        let tasks = self.store.get_tasks_by_phase(project_id, phase)?;
        Ok(calculator::phase_progress(&tasks))
    }

    /// Completion of `phase` for a project, 0 on failure.
    pub fn calculate_phase_progress(&self, project_id: Uuid, phase: Phase) -> u8 {
        self.try_phase_progress(project_id, phase)
            .unwrap_or_else(|e| {
                tracing::warn!(
                    "Failed to calculate {} progress for project {}: {}",
                    phase,
                    project_id,
                    e
                );
                0
            })
    }

    // ============================================================
    // Project progress
    // ============================================================

    pub fn try_project_progress(&self, project_id: Uuid) -> Result<u8, ProgressError> {
        let project = self.load_project(project_id)?;

        if self.catalog.position(project.current_phase).is_none() {
            tracing::warn!(
                "Project {} is in phase {} which the catalog does not list; reporting 0%",
                project_id,
                project.current_phase
            );
            return Ok(0);
        }

        let phase_progress = self.try_phase_progress(project_id, project.current_phase)?;
        Ok(
            calculator::project_progress(&self.catalog, project.current_phase, phase_progress)
                .unwrap_or(0),
        )
    }

    /// Overall completion of a project, 0 on failure.
    pub fn calculate_project_progress(&self, project_id: Uuid) -> u8 {
        self.try_project_progress(project_id).unwrap_or_else(|e| {
            tracing::warn!(
                "Failed to calculate progress for project {}: {}",
                project_id,
                e
            );
            0
        })
    }

    /// Current phase, its completion, and overall completion in one read.
    pub fn try_progress_snapshot(&self, project_id: Uuid) -> Result<ProjectProgress, ProgressError> {
        let project = self.load_project(project_id)?;
        let phase_progress = self.try_phase_progress(project_id, project.current_phase)?;
        let progress =
            calculator::project_progress(&self.catalog, project.current_phase, phase_progress)
                .unwrap_or(0);

        Ok(ProjectProgress {
            project_id,
            current_phase: project.current_phase,
            phase_progress,
            progress,
        })
    }

    // ============================================================
    // Phase advancement
    // ============================================================

    /// Moves the project one phase forward if its current phase is complete.
    ///
    /// Never moves backward, never skips, and never enters a zero-weight phase.
    pub fn try_check_and_advance_phase(
        &self,
        project_id: Uuid,
    ) -> Result<AdvanceOutcome, ProgressError> {
        let project = self.load_project(project_id)?;
        let current = project.current_phase;

        if self.catalog.position(current).is_none() {
            return Err(ProgressError::PhaseNotInCatalog(current));
        }

        let phase_progress = self.try_phase_progress(project_id, current)?;
        let Some(next) = calculator::advancement_target(&self.catalog, current, phase_progress)
        else {
            if phase_progress >= 100 {
                tracing::debug!(
                    "Project {} finished {} but has no weighted phase to advance into",
                    project_id,
                    current
                );
            }
            return Ok(AdvanceOutcome::stayed());
        };

        self.store.set_current_phase(project_id, next)?;
        tracing::info!(
            "Project {} advanced from {} to {}",
            project_id,
            current,
            next
        );

        let activity = CreateActivityInput {
            project_id,
            activity_type: ActivityType::PhaseAdvanced,
            description: format!(
                "Project advanced from {} to {} phase",
                current.display_name(),
                next.display_name()
            ),
            metadata: json!({
                "from_phase": current,
                "to_phase": next,
                "phase_progress": phase_progress,
            }),
        };
        if let Err(e) = self.store.create_activity(activity) {
            tracing::warn!(
                "Failed to log phase advancement for project {}: {}",
                project_id,
                e
            );
        }

        Ok(AdvanceOutcome::advanced_to(next))
    }

    pub fn check_and_advance_phase(&self, project_id: Uuid) -> AdvanceOutcome {
        self.try_check_and_advance_phase(project_id)
            .unwrap_or_else(|e| {
                tracing::warn!(
                    "Phase advancement check failed for project {}: {}",
                    project_id,
                    e
                );
                AdvanceOutcome::stayed()
            })
    }

    // ============================================================
    // Persistence
    // ============================================================

    /// Stores `progress` (or a fresh computation) on the project, appends a
    /// history entry, then notifies listeners.
    pub fn try_update_project_progress(
        &self,
        project_id: Uuid,
        progress: Option<u8>,
    ) -> Result<u8, ProgressError> {
        let progress = match progress {
            Some(p) => p.min(100),
            None => self.try_project_progress(project_id)?,
        };

        self.store.set_progress_percentage(project_id, progress)?;
        self.store.create_progress_entry(project_id, progress)?;

        self.notifier.notify(&ProgressEvent {
            project_id,
            progress,
        });

        Ok(progress)
    }

    pub fn update_project_progress(&self, project_id: Uuid, progress: Option<u8>) -> u8 {
        self.try_update_project_progress(project_id, progress)
            .unwrap_or_else(|e| {
                tracing::error!(
                    "Failed to persist progress for project {}: {}",
                    project_id,
                    e
                );
                0
            })
    }

    // ============================================================
    // Orchestration
    // ============================================================

    /// Runs after a task's status changes: advance, recompute, persist, log.
    ///
    /// Advancement runs first so the recomputed progress reflects the new
    /// phase. If the recomputation fails, nothing is persisted, the activity
    /// is still written with a null `new_progress`, and the error is returned.
    pub fn try_handle_task_status_change(
        &self,
        project_id: Uuid,
        task_id: Uuid,
        old_status: TaskStatus,
        new_status: TaskStatus,
    ) -> Result<u8, ProgressError> {
        let advance = self.check_and_advance_phase(project_id);
        let progress = self.try_project_progress(project_id);
        if let Ok(value) = &progress {
            self.persist_best_effort(project_id, *value);
        }

        let mut description = format!(
            "Task status changed from {} to {}",
            old_status.as_str(),
            new_status.as_str()
        );
        if let Some(phase) = advance.new_phase {
            description.push_str(&format!("; project advanced to {} phase", phase.display_name()));
        }

        let activity = CreateActivityInput {
            project_id,
            activity_type: ActivityType::TaskStatusChange,
            description,
            metadata: json!({
                "task_id": task_id,
                "old_status": old_status,
                "new_status": new_status,
                "new_progress": progress.as_ref().ok(),
                "phase_advanced": advance.advanced,
                "new_phase": advance.new_phase,
            }),
        };
        if let Err(e) = self.store.create_activity(activity) {
            tracing::warn!(
                "Failed to log status change of task {} on project {}: {}",
                task_id,
                project_id,
                e
            );
        }

        progress
    }

    /// Entry point for task edit handlers. Returns the new progress, 0 on failure.
    pub fn handle_task_status_change(
        &self,
        project_id: Uuid,
        task_id: Uuid,
        old_status: TaskStatus,
        new_status: TaskStatus,
    ) -> u8 {
        self.try_handle_task_status_change(project_id, task_id, old_status, new_status)
            .unwrap_or_else(|e| {
                tracing::error!(
                    "Failed to handle status change of task {} on project {}: {}",
                    task_id,
                    project_id,
                    e
                );
                0
            })
    }

    /// Full resync of one project.
    ///
    /// Same sequence as a task status change, without the activity entry.
    /// When progress reaches 100 on an `active` project, the project is
    /// marked `completed` and parked in the last weighted phase. Only a
    /// failed recomputation is an error; failed writes are logged.
    pub fn try_sync_all_project_data(&self, project_id: Uuid) -> Result<SyncReport, ProgressError> {
        let advance = self.check_and_advance_phase(project_id);
        let progress = self.try_project_progress(project_id)?;
        self.persist_best_effort(project_id, progress);

        let completed = progress == 100 && self.complete_best_effort(project_id);

        Ok(SyncReport {
            project_id,
            progress,
            advanced: advance.advanced,
            new_phase: advance.new_phase,
            completed,
        })
    }

    /// Returns the synced progress, 0 on failure.
    pub fn sync_all_project_data(&self, project_id: Uuid) -> u8 {
        self.try_sync_all_project_data(project_id)
            .map(|report| report.progress)
            .unwrap_or_else(|e| {
                tracing::error!("Failed to sync project {}: {}", project_id, e);
                0
            })
    }

    /// Marks an `active` project completed and parks it in the last weighted
    /// phase. Returns whether the status write happened.
    fn complete_best_effort(&self, project_id: Uuid) -> bool {
        match self.load_project(project_id) {
            Ok(project) if project.status == ProjectStatus::Active => {}
            Ok(_) => return false,
            Err(e) => {
                tracing::error!("Failed to reload project {}: {}", project_id, e);
                return false;
            }
        }

        if let Err(e) = self
            .store
            .set_project_status(project_id, ProjectStatus::Completed)
        {
            tracing::error!("Failed to complete project {}: {}", project_id, e);
            return false;
        }
        tracing::info!("Project {} completed", project_id);

        if let Some(final_phase) = self.catalog.final_weighted_phase() {
            if let Err(e) = self.store.set_current_phase(project_id, final_phase) {
                tracing::warn!(
                    "Failed to move completed project {} to {}: {}",
                    project_id,
                    final_phase,
                    e
                );
            }
        }
        true
    }

    fn persist_best_effort(&self, project_id: Uuid, progress: u8) {
        if let Err(e) = self.try_update_project_progress(project_id, Some(progress)) {
            tracing::error!(
                "Failed to persist progress for project {}: {}",
                project_id,
                e
            );
        }
    }
}

impl<S> std::fmt::Debug for ProgressSync<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressSync")
            .field("catalog", &self.catalog)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}
