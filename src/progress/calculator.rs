//! Weighted progress arithmetic.
//!
//! These functions are pure; [`super::ProgressSync`] feeds them rows from the
//! store.

use crate::models::{Phase, Task, TaskPriority, TaskStatus};

use super::catalog::PhaseCatalog;

/// Weight a task carries within its phase: high 3, medium 2, low or unset 1.
pub fn priority_weight(priority: Option<TaskPriority>) -> f64 {
    match priority {
        Some(TaskPriority::High) => 3.0,
        Some(TaskPriority::Medium) => 2.0,
        Some(TaskPriority::Low) | None => 1.0,
    }
}

/// Share of a task's weight that counts as done.
fn completion_factor(status: TaskStatus) -> f64 {
    match status {
        TaskStatus::Completed => 1.0,
        TaskStatus::InProgress => 0.5,
        TaskStatus::Pending | TaskStatus::Blocked => 0.0,
    }
}

/// Completion of one phase, 0 to 100, from the tasks tagged with it.
///
/// A phase with no tasks is 0% complete, never 100%, so an empty phase can
/// not trigger advancement.
pub fn phase_progress(tasks: &[Task]) -> u8 {
    if tasks.is_empty() {
        return 0;
    }

    let (done, total) = tasks.iter().fold((0.0, 0.0), |(done, total), task| {
        let weight = priority_weight(task.priority);
        (done + weight * completion_factor(task.status), total + weight)
    });

    (100.0 * done / total).round() as u8
}

/// Overall completion of a project sitting in `current_phase`.
///
/// Every phase before the current one is credited in full; the current phase
/// contributes `weight * phase_progress / 100`. Returns `None` when the
/// catalog does not list `current_phase`.
pub fn project_progress(catalog: &PhaseCatalog, current_phase: Phase, phase_progress: u8) -> Option<u8> {
    let completed = catalog.weight_before(current_phase)? as f64;
    let partial = catalog.weight(current_phase) as f64 * phase_progress as f64 / 100.0;
    Some((completed + partial).min(100.0).round() as u8)
}

/// The phase to advance into, if `phase_progress` says the current phase is done.
pub fn advancement_target(catalog: &PhaseCatalog, current_phase: Phase, phase_progress: u8) -> Option<Phase> {
    if phase_progress < 100 {
        return None;
    }
    catalog.next_weighted(current_phase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::catalog::PhaseWeight;
    use chrono::Utc;
    use uuid::Uuid;

    fn task(status: TaskStatus, priority: Option<TaskPriority>) -> Task {
        Task {
            id: Uuid::new_v4(),
            project_id: Uuid::nil(),
            title: "task".to_string(),
            description: None,
            status,
            priority,
            phase: Some(Phase::Concept),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_phase_is_zero() {
        assert_eq!(phase_progress(&[]), 0);
    }

    #[test]
    fn all_completed_is_100_for_any_priority_mix() {
        let tasks = vec![
            task(TaskStatus::Completed, Some(TaskPriority::High)),
            task(TaskStatus::Completed, Some(TaskPriority::Medium)),
            task(TaskStatus::Completed, Some(TaskPriority::Low)),
            task(TaskStatus::Completed, None),
        ];
        assert_eq!(phase_progress(&tasks), 100);
    }

    #[test]
    fn high_completed_and_low_pending_is_75() {
        let tasks = vec![
            task(TaskStatus::Completed, Some(TaskPriority::High)),
            task(TaskStatus::Pending, Some(TaskPriority::Low)),
        ];
        assert_eq!(phase_progress(&tasks), 75);
    }

    #[test]
    fn in_progress_counts_half() {
        let tasks = vec![task(TaskStatus::InProgress, Some(TaskPriority::Medium))];
        assert_eq!(phase_progress(&tasks), 50);
    }

    #[test]
    fn blocked_counts_nothing() {
        let tasks = vec![
            task(TaskStatus::Blocked, Some(TaskPriority::High)),
            task(TaskStatus::Completed, None),
        ];
        assert_eq!(phase_progress(&tasks), 25);
    }

    #[test]
    fn rounds_half_up() {
        // 0.5 / 4 = 12.5%
        let tasks = vec![
            task(TaskStatus::InProgress, None),
            task(TaskStatus::Pending, None),
            task(TaskStatus::Pending, None),
            task(TaskStatus::Pending, None),
        ];
        assert_eq!(phase_progress(&tasks), 13);
    }

    #[test]
    fn execution_at_zero_is_45() {
        let catalog = PhaseCatalog::default();
        assert_eq!(project_progress(&catalog, Phase::Execution, 0), Some(45));
    }

    #[test]
    fn partial_current_phase_is_weighted() {
        let catalog = PhaseCatalog::default();
        // 10 + 20 * 0.5
        assert_eq!(project_progress(&catalog, Phase::Design, 50), Some(20));
        // 45 + 45 * 0.33 = 59.85
        assert_eq!(project_progress(&catalog, Phase::Execution, 33), Some(60));
    }

    #[test]
    fn handover_complete_is_100() {
        let catalog = PhaseCatalog::default();
        assert_eq!(project_progress(&catalog, Phase::Handover, 100), Some(100));
    }

    #[test]
    fn never_exceeds_100() {
        let catalog = PhaseCatalog::default();
        for phase in Phase::ALL {
            for pct in [0, 50, 99, 100, 255] {
                assert!(project_progress(&catalog, phase, pct).unwrap() <= 100);
            }
        }
    }

    #[test]
    fn phase_missing_from_catalog_has_no_progress() {
        let catalog = PhaseCatalog::new(vec![PhaseWeight {
            phase: Phase::Execution,
            weight: 100,
        }])
        .unwrap();
        assert_eq!(project_progress(&catalog, Phase::Design, 100), None);
    }

    #[test]
    fn advancement_requires_full_phase() {
        let catalog = PhaseCatalog::default();
        assert_eq!(advancement_target(&catalog, Phase::Concept, 99), None);
        assert_eq!(
            advancement_target(&catalog, Phase::Concept, 100),
            Some(Phase::Design)
        );
    }

    #[test]
    fn advancement_refuses_zero_weight_phase() {
        let catalog = PhaseCatalog::default();
        assert_eq!(advancement_target(&catalog, Phase::Handover, 100), None);
    }
}
