//! Phase-weighted project progress and automatic phase advancement.
//!
//! # Model
//!
//! A project sits in exactly one [`Phase`](crate::models::Phase) at a time.
//! Phases before the current one count as fully done; the current phase is
//! credited by the weighted share of its tasks that are complete (high
//! priority 3, medium 2, low 1; in-progress tasks count half).
//!
//! When the current phase reaches 100%, the project moves one phase forward,
//! unless the next phase carries no weight in the [`PhaseCatalog`].
//!
//! # Entry points
//!
//! - [`ProgressSync::calculate_phase_progress`]
//! - [`ProgressSync::calculate_project_progress`]
//! - [`ProgressSync::handle_task_status_change`]
//! - [`ProgressSync::sync_all_project_data`]
//! - [`ProgressSync::subscribe`] for change notifications

pub mod calculator;
mod catalog;
mod notify;
mod store;
mod sync;

pub use catalog::{PhaseCatalog, PhaseWeight};
pub use notify::{ProgressEvent, ProgressNotifier, Subscription};
pub use store::ProgressStore;
pub use sync::ProgressSync;
