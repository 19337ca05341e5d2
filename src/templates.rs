//! Default task lists for each lifecycle phase.
//!
//! Applying a template seeds a project with the usual work for a phase so its
//! progress has something to measure.

use crate::models::{Phase, TaskPriority};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateTask {
    pub title: &'static str,
    pub priority: TaskPriority,
}

const fn task(title: &'static str, priority: TaskPriority) -> TemplateTask {
    TemplateTask { title, priority }
}

const CONCEPT: &[TemplateTask] = &[
    task("Define project brief and objectives", TaskPriority::High),
    task("Site feasibility study", TaskPriority::High),
    task("Preliminary budget estimate", TaskPriority::Medium),
    task("Identify certification targets", TaskPriority::Low),
];

const DESIGN: &[TemplateTask] = &[
    task("Schematic design", TaskPriority::High),
    task("Design development", TaskPriority::High),
    task("Construction documents", TaskPriority::High),
    task("Energy model review", TaskPriority::Medium),
    task("Client design sign-off", TaskPriority::Medium),
];

const PRE_CONSTRUCTION: &[TemplateTask] = &[
    task("Obtain building permits", TaskPriority::High),
    task("Contractor bidding and award", TaskPriority::High),
    task("Construction schedule baseline", TaskPriority::Medium),
    task("Site logistics plan", TaskPriority::Low),
];

const EXECUTION: &[TemplateTask] = &[
    task("Site preparation and earthworks", TaskPriority::High),
    task("Foundations", TaskPriority::High),
    task("Structural frame", TaskPriority::High),
    task("Building envelope", TaskPriority::High),
    task("MEP rough-in", TaskPriority::Medium),
    task("Interior finishes", TaskPriority::Medium),
    task("Landscaping", TaskPriority::Low),
];

const HANDOVER: &[TemplateTask] = &[
    task("Commissioning", TaskPriority::High),
    task("Punch list closeout", TaskPriority::High),
    task("As-built documentation", TaskPriority::Medium),
    task("Owner training", TaskPriority::Low),
];

/// Tasks seeded for `phase`. Zero-weight phases have no template.
pub fn phase_template(phase: Phase) -> &'static [TemplateTask] {
    match phase {
        Phase::Concept => CONCEPT,
        Phase::Design => DESIGN,
        Phase::PreConstruction => PRE_CONSTRUCTION,
        Phase::Execution => EXECUTION,
        Phase::Handover => HANDOVER,
        Phase::OperationsMaintenance | Phase::RenovationDemolition => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_phases_have_templates() {
        for phase in [
            Phase::Concept,
            Phase::Design,
            Phase::PreConstruction,
            Phase::Execution,
            Phase::Handover,
        ] {
            assert!(!phase_template(phase).is_empty(), "{phase} has no template");
        }
    }

    #[test]
    fn post_completion_phases_have_none() {
        assert!(phase_template(Phase::OperationsMaintenance).is_empty());
        assert!(phase_template(Phase::RenovationDemolition).is_empty());
    }
}
