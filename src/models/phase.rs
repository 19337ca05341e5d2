use serde::{Deserialize, Serialize};

/// A stage of a construction project's lifecycle.
///
/// Phases are strictly ordered; the order and the share of overall completion
/// each phase carries live in [`crate::progress::PhaseCatalog`], not here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Concept,
    Design,
    PreConstruction,
    Execution,
    Handover,
    OperationsMaintenance,
    RenovationDemolition,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Self::Concept,
        Self::Design,
        Self::PreConstruction,
        Self::Execution,
        Self::Handover,
        Self::OperationsMaintenance,
        Self::RenovationDemolition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concept => "concept",
            Self::Design => "design",
            Self::PreConstruction => "pre_construction",
            Self::Execution => "execution",
            Self::Handover => "handover",
            Self::OperationsMaintenance => "operations_maintenance",
            Self::RenovationDemolition => "renovation_demolition",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "concept" => Some(Self::Concept),
            "design" => Some(Self::Design),
            "pre_construction" => Some(Self::PreConstruction),
            "execution" => Some(Self::Execution),
            "handover" => Some(Self::Handover),
            "operations_maintenance" => Some(Self::OperationsMaintenance),
            "renovation_demolition" => Some(Self::RenovationDemolition),
            _ => None,
        }
    }

    /// Human-readable name used in activity descriptions.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Concept => "Concept",
            Self::Design => "Design",
            Self::PreConstruction => "Pre-Construction",
            Self::Execution => "Execution",
            Self::Handover => "Handover",
            Self::OperationsMaintenance => "Operations & Maintenance",
            Self::RenovationDemolition => "Renovation / Demolition",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_form_matches_serde_form() {
        for phase in Phase::ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.as_str()));
            assert_eq!(Phase::from_str(phase.as_str()), Some(phase));
        }
    }

    #[test]
    fn unknown_phase_string_is_rejected() {
        assert_eq!(Phase::from_str("demolished"), None);
        assert_eq!(Phase::from_str(""), None);
    }
}
