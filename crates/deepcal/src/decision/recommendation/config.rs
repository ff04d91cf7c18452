use serde::{Deserialize, Serialize};

use crate::decision::error::DecisionError;
use crate::decision::neutrosophic::AdmissionThresholds;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMethod {
    #[default]
    Vector,
}

/// Recognised engine options. Unknown keys are rejected when deserialising.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct EngineConfig {
    pub truth_min: f64,
    pub indeterminacy_max: f64,
    pub falsity_max: f64,
    pub sum_max: f64,
    pub rule_influence: f64,
    pub distance_metric: DistanceMetric,
    pub normalization_method: NormalizationMethod,
    /// Criterion nudged by rule support; `null` disables blending.
    pub blend_criterion: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let thresholds = AdmissionThresholds::default();
        Self {
            truth_min: thresholds.truth_min,
            indeterminacy_max: thresholds.indeterminacy_max,
            falsity_max: thresholds.falsity_max,
            sum_max: thresholds.sum_max,
            rule_influence: 0.3,
            distance_metric: DistanceMetric::Euclidean,
            normalization_method: NormalizationMethod::Vector,
            blend_criterion: Some("risk".to_string()),
        }
    }
}

impl EngineConfig {
    pub fn from_json(raw: &str) -> Result<Self, DecisionError> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|err| DecisionError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn thresholds(&self) -> AdmissionThresholds {
        AdmissionThresholds {
            truth_min: self.truth_min,
            indeterminacy_max: self.indeterminacy_max,
            falsity_max: self.falsity_max,
            sum_max: self.sum_max,
        }
    }

    pub fn validate(&self) -> Result<(), DecisionError> {
        self.thresholds().validate()?;
        if !self.rule_influence.is_finite() || !(0.0..=1.0).contains(&self.rule_influence) {
            return Err(DecisionError::InvalidConfig(format!(
                "ruleInfluence must lie in [0, 1], found {}",
                self.rule_influence
            )));
        }
        Ok(())
    }
}
