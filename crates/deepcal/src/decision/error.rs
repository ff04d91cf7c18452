use serde::{Deserialize, Serialize};

/// Input validation failures raised before any ranking computation starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecisionError {
    #[error("no alternatives supplied")]
    NoAlternatives,
    #[error("criterion weights must each lie in [0, 1] and sum to 1.0 (found sum {sum:.6})")]
    InvalidWeights { sum: f64 },
    #[error("alternative '{alternative_id}' has {found} criteria values, expected {expected}")]
    ShapeMismatch {
        alternative_id: String,
        expected: usize,
        found: usize,
    },
    #[error("alternative '{alternative_id}' has a non-finite value for criterion '{criterion}'")]
    InvalidValue {
        alternative_id: String,
        criterion: String,
    },
    #[error("alternative id '{0}' appears more than once")]
    DuplicateAlternative(String),
    #[error("observation for '{alternative_id}'/'{field_name}' does not match any alternative criterion")]
    UnknownObservationTarget {
        alternative_id: String,
        field_name: String,
    },
    #[error("rule '{rule_id}' is malformed: {reason}")]
    InvalidRule { rule_id: String, reason: String },
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}

/// Non-fatal conditions surfaced alongside a recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DecisionWarning {
    /// No rule cleared the admission thresholds; rule influence was forced to 0.
    LowConfidenceNoRulesAdmitted,
    #[serde(rename_all = "camelCase")]
    UnresolvedObservation {
        alternative_id: String,
        field_name: String,
    },
}

impl DecisionWarning {
    pub fn summary(&self) -> String {
        match self {
            DecisionWarning::LowConfidenceNoRulesAdmitted => {
                "low confidence: no rules admitted, rule influence disabled".to_string()
            }
            DecisionWarning::UnresolvedObservation {
                alternative_id,
                field_name,
            } => format!(
                "unresolved observation for {alternative_id}/{field_name}: using the column mean"
            ),
        }
    }
}
