use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::decision::domain::{
    Alternative, CriterionObservation, CriterionSpec, Direction, WhitenedValue,
};
use crate::decision::error::{DecisionError, DecisionWarning};
use crate::decision::grey::GreyWhitener;
use crate::decision::neutrosophic::RuleAdmission;

/// Whitened observation tagged with the alternative it fills.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedObservation {
    pub alternative_id: String,
    pub value: WhitenedValue,
}

/// Resolves each observation's `(alternative index, criterion index)` before anything is whitened.
pub(crate) fn locate_observations(
    alternatives: &[Alternative],
    criteria: &[CriterionSpec],
    observations: &[CriterionObservation],
) -> Result<Vec<(usize, usize)>, DecisionError> {
    let alternative_index: HashMap<&str, usize> = alternatives
        .iter()
        .enumerate()
        .map(|(index, alternative)| (alternative.id.as_str(), index))
        .collect();

    observations
        .iter()
        .map(|entry| {
            let row = alternative_index.get(entry.alternative_id.as_str()).copied();
            let column = criterion_index(criteria, &entry.observation.field_name);
            match (row, column) {
                (Some(row), Some(column)) => Ok((row, column)),
                _ => Err(DecisionError::UnknownObservationTarget {
                    alternative_id: entry.alternative_id.clone(),
                    field_name: entry.observation.field_name.clone(),
                }),
            }
        })
        .collect()
}

pub(crate) fn criterion_index(criteria: &[CriterionSpec], name: &str) -> Option<usize> {
    criteria
        .iter()
        .position(|criterion| criterion.name.eq_ignore_ascii_case(name.trim()))
}

/// Writes whitened estimates into `alternatives`, returning the resolved values and any warnings.
///
/// An observation that cannot be resolved takes the mean of the column's remaining values, so a
/// missing quote never lands on the ideal point by accident. The field default is kept only when
/// the whole column is unresolved.
pub(crate) fn apply_whitening(
    whitener: &GreyWhitener,
    alternatives: &mut [Alternative],
    observations: &[CriterionObservation],
    targets: &[(usize, usize)],
) -> (Vec<ResolvedObservation>, Vec<DecisionWarning>) {
    let mut resolved = Vec::with_capacity(observations.len());
    let mut warnings = Vec::new();
    let mut unresolved_cells = HashSet::new();

    for (entry, &(row, column)) in observations.iter().zip(targets) {
        let value = whitener.whiten(&entry.observation, None);
        if value.is_resolved() {
            unresolved_cells.remove(&(row, column));
        } else {
            unresolved_cells.insert((row, column));
            warnings.push(DecisionWarning::UnresolvedObservation {
                alternative_id: entry.alternative_id.clone(),
                field_name: entry.observation.field_name.clone(),
            });
        }
        alternatives[row].criteria[column] = value.estimated_value;
        resolved.push(ResolvedObservation {
            alternative_id: entry.alternative_id.clone(),
            value,
        });
    }

    for (entry, &(row, column)) in resolved.iter_mut().zip(targets) {
        if !unresolved_cells.contains(&(row, column)) {
            continue;
        }
        let Some(neutral) = column_mean_excluding(alternatives, column, &unresolved_cells) else {
            continue;
        };
        alternatives[row].criteria[column] = neutral;
        entry.value.estimated_value = neutral;
    }

    debug!(
        whitened = resolved.len(),
        unresolved = warnings.len(),
        "grey whitening applied"
    );
    (resolved, warnings)
}

fn column_mean_excluding(
    alternatives: &[Alternative],
    column: usize,
    excluded: &HashSet<(usize, usize)>,
) -> Option<f64> {
    let known: Vec<f64> = alternatives
        .iter()
        .enumerate()
        .filter(|(row, _)| !excluded.contains(&(*row, column)))
        .map(|(_, alternative)| alternative.criteria[column])
        .collect();
    if known.is_empty() {
        return None;
    }
    Some(known.iter().sum::<f64>() / known.len() as f64)
}

/// Nudges the `column` criterion towards the rule-derived value:
/// `value * (1 - influence) + derived * influence`.
///
/// The derived value scales the column maximum by rule support for benefit criteria and by its
/// complement for cost criteria. Returns how many alternatives were adjusted.
pub(crate) fn blend_rule_support(
    alternatives: &mut [Alternative],
    criterion: &CriterionSpec,
    column: usize,
    admission: &RuleAdmission,
    influence: f64,
) -> usize {
    if influence <= 0.0 || admission.is_empty() {
        return 0;
    }

    let column_max = alternatives
        .iter()
        .map(|alternative| alternative.criteria[column])
        .fold(f64::NEG_INFINITY, f64::max);
    if !column_max.is_finite() {
        return 0;
    }

    let mut adjusted = 0;
    for alternative in alternatives.iter_mut() {
        let Some(support) = admission.support_for(&alternative.id) else {
            continue;
        };
        let derived = match criterion.direction {
            Direction::Benefit => column_max * support,
            Direction::Cost => column_max * (1.0 - support),
        };
        let value = &mut alternative.criteria[column];
        *value = *value * (1.0 - influence) + derived * influence;
        adjusted += 1;
    }
    adjusted
}
