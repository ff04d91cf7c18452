//! Rule admission under truth/indeterminacy/falsity thresholds.
//!
//! Only rules that are true enough, determinate enough and rarely false may influence a
//! decision. Survivors are ordered by confidence and their confidences normalised into weights.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::Rule;
use super::error::DecisionError;

/// Bounds a rule must satisfy to be admitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdmissionThresholds {
    pub truth_min: f64,
    pub indeterminacy_max: f64,
    pub falsity_max: f64,
    pub sum_max: f64,
}

impl Default for AdmissionThresholds {
    fn default() -> Self {
        Self {
            truth_min: 0.80,
            indeterminacy_max: 0.10,
            falsity_max: 0.05,
            sum_max: 1.2,
        }
    }
}

impl AdmissionThresholds {
    /// Looser bounds for exploratory scenarios.
    pub fn exploratory() -> Self {
        Self {
            truth_min: 0.60,
            indeterminacy_max: 0.25,
            falsity_max: 0.15,
            sum_max: 1.2,
        }
    }

    pub fn validate(&self) -> Result<(), DecisionError> {
        let unit = [
            ("truthMin", self.truth_min),
            ("indeterminacyMax", self.indeterminacy_max),
            ("falsityMax", self.falsity_max),
        ];
        for (name, value) in unit {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(DecisionError::InvalidConfig(format!(
                    "{name} must lie in [0, 1], found {value}"
                )));
            }
        }
        if !self.sum_max.is_finite() || !(0.0..=3.0).contains(&self.sum_max) {
            return Err(DecisionError::InvalidConfig(format!(
                "sumMax must lie in [0, 3], found {}",
                self.sum_max
            )));
        }
        Ok(())
    }

    /// Malformed rules are never admitted, whatever the bounds.
    pub fn admits(&self, rule: &Rule) -> bool {
        rule.validate().is_ok()
            && rule.truth >= self.truth_min
            && rule.indeterminacy <= self.indeterminacy_max
            && rule.falsity <= self.falsity_max
            && rule.neutrosophic_sum() <= self.sum_max
    }
}

/// Rules clearing `thresholds`, highest confidence first. Ties keep their input order.
pub fn admit(rules: &[Rule], thresholds: &AdmissionThresholds) -> Vec<Rule> {
    let mut admitted: Vec<Rule> = rules
        .iter()
        .filter(|rule| thresholds.admits(rule))
        .cloned()
        .collect();

    // sort_by is stable, so equal confidences stay in input order
    admitted.sort_by(|a, b| b.confidence().total_cmp(&a.confidence()));

    debug!(
        admitted = admitted.len(),
        total = rules.len(),
        "neutrosophic filter applied"
    );
    admitted
}

/// Normalises admitted confidences into weights summing to 1.0.
pub fn weights(admitted: &[Rule]) -> Vec<f64> {
    if admitted.is_empty() {
        return Vec::new();
    }

    let total: f64 = admitted.iter().map(Rule::confidence).sum();
    if total <= 0.0 || !total.is_finite() {
        let uniform = 1.0 / admitted.len() as f64;
        return vec![uniform; admitted.len()];
    }

    admitted
        .iter()
        .map(|rule| rule.confidence() / total)
        .collect()
}

/// Weighted confidence of the admitted set, clamped to `[0, 1]`.
pub fn rule_set_confidence(admitted: &[Rule], weights: &[f64]) -> f64 {
    admitted
        .iter()
        .zip(weights)
        .map(|(rule, weight)| rule.confidence() * weight)
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

/// Admitted rules paired with their normalised weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleAdmission {
    pub admitted: Vec<Rule>,
    pub weights: Vec<f64>,
    pub evaluated: usize,
}

impl RuleAdmission {
    pub fn evaluate(rules: &[Rule], thresholds: &AdmissionThresholds) -> Self {
        let admitted = admit(rules, thresholds);
        let weights = weights(&admitted);
        Self {
            admitted,
            weights,
            evaluated: rules.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.admitted.is_empty()
    }

    pub fn confidence(&self) -> f64 {
        rule_set_confidence(&self.admitted, &self.weights)
    }

    /// Weight-and-confidence blend of the admitted rules that speak about `alternative_id`.
    ///
    /// Each rule contributes `normalised weight * rule weight`; returns `None` when no admitted
    /// rule applies or every contribution is zero.
    pub fn support_for(&self, alternative_id: &str) -> Option<f64> {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (rule, weight) in self.admitted.iter().zip(&self.weights) {
            if !rule.applies_to(alternative_id) {
                continue;
            }
            let influence = weight * rule.weight.clamp(0.0, 1.0);
            numerator += influence * rule.confidence();
            denominator += influence;
        }

        if denominator > 0.0 {
            Some((numerator / denominator).clamp(0.0, 1.0))
        } else {
            None
        }
    }
}
