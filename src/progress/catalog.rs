//! Phase order and weights.

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::models::Phase;

/// One catalog row: a phase and the share of overall completion it carries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhaseWeight {
    pub phase: Phase,
    pub weight: u32,
}

/// Ordered list of lifecycle phases with their weights.
///
/// The catalog is an immutable value handed to [`super::ProgressSync`], so
/// deployments and tests can run against alternate catalogs.
///
/// # Invariants
/// - At least one entry, no phase listed twice.
/// - Every weight is within `0..=100`.
/// - Weights sum to exactly 100.
///
/// A catalog may omit phases. Projects whose current phase is absent are
/// reported as 0% complete.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PhaseCatalog {
    entries: Vec<PhaseWeight>,
}

impl PhaseCatalog {
    /// Builds a catalog, checking its invariants.
    pub fn new(entries: Vec<PhaseWeight>) -> Result<Self, CatalogError> {
        let catalog = Self { entries };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = Vec::with_capacity(self.entries.len());
        let mut total = 0u32;
        for entry in &self.entries {
            if seen.contains(&entry.phase) {
                return Err(CatalogError::DuplicatePhase(entry.phase));
            }
            seen.push(entry.phase);

            if entry.weight > 100 {
                return Err(CatalogError::WeightOutOfRange {
                    phase: entry.phase,
                    weight: entry.weight,
                });
            }
            total += entry.weight;
        }

        if total != 100 {
            return Err(CatalogError::WeightSum(total));
        }
        Ok(())
    }

    pub fn entries(&self) -> &[PhaseWeight] {
        &self.entries
    }

    /// Phases in lifecycle order.
    pub fn order(&self) -> impl Iterator<Item = Phase> + '_ {
        self.entries.iter().map(|e| e.phase)
    }

    /// Weight of `phase`, or 0 if the catalog does not list it.
    pub fn weight(&self, phase: Phase) -> u32 {
        self.entries
            .iter()
            .find(|e| e.phase == phase)
            .map(|e| e.weight)
            .unwrap_or(0)
    }

    pub fn position(&self, phase: Phase) -> Option<usize> {
        self.entries.iter().position(|e| e.phase == phase)
    }

    /// Sum of the weights of every phase strictly before `phase`.
    pub fn weight_before(&self, phase: Phase) -> Option<u32> {
        let idx = self.position(phase)?;
        Some(self.entries[..idx].iter().map(|e| e.weight).sum())
    }

    /// The phase directly after `phase`, if it exists and carries weight.
    ///
    /// Zero-weight phases (post-completion tracks) are never entered
    /// automatically, and only one step is taken at a time.
    pub fn next_weighted(&self, phase: Phase) -> Option<Phase> {
        let idx = self.position(phase)?;
        self.entries
            .get(idx + 1)
            .filter(|next| next.weight > 0)
            .map(|next| next.phase)
    }

    /// Last phase that carries weight; a finished project rests here.
    pub fn final_weighted_phase(&self) -> Option<Phase> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.weight > 0)
            .map(|e| e.phase)
    }
}

impl Default for PhaseCatalog {
    /// The shipped catalog: 10 + 20 + 15 + 45 + 10 + 0 + 0.
    fn default() -> Self {
        let weights = [10, 20, 15, 45, 10, 0, 0];
        Self {
            entries: Phase::ALL
                .iter()
                .zip(weights)
                .map(|(&phase, weight)| PhaseWeight { phase, weight })
                .collect(),
        }
    }
}
