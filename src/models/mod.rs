//! Domain models for SiteTrack.
//!
//! # Core Concepts
//!
//! ## Mutable Entities
//!
//! - [`Project`]: A construction project moving through lifecycle [`Phase`]s.
//!   Its progress and current phase are derived from its tasks.
//! - [`Task`]: Work item on a project, optionally tagged with a phase and priority.
//!
//! ## Append-only Entities
//!
//! These are written once and never updated:
//!
//! - [`ProgressEntry`]: History of computed progress values.
//! - [`Activity`]: Log of task status changes and phase advancements.

mod activity;
mod phase;
mod progress;
mod project;
mod task;

pub use activity::*;
pub use phase::*;
pub use progress::*;
pub use project::*;
pub use task::*;
