//! Error types for the progress core.

use thiserror::Error;
use uuid::Uuid;

use crate::models::Phase;

/// Failure of a progress operation.
///
/// The public entry points of [`crate::progress::ProgressSync`] collapse these
/// to safe defaults; the `try_*` variants surface them.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),

    #[error("Phase {0} is not part of the phase catalog")]
    PhaseNotInCatalog(Phase),

    #[error("Store operation failed: {0}")]
    Store(#[from] anyhow::Error),
}

/// A phase catalog that violates its invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Phase catalog is empty")]
    Empty,

    #[error("Phase {0} appears more than once in the catalog")]
    DuplicatePhase(Phase),

    #[error("Weight {weight} for phase {phase} is outside 0..=100")]
    WeightOutOfRange { phase: Phase, weight: u32 },

    #[error("Phase weights sum to {0}, expected 100")]
    WeightSum(u32),
}
