//! TOPSIS ranking: vector normalisation, weighting, ideal/anti-ideal points and closeness.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{Alternative, CriterionSpec, Direction, RankingResult};
use super::error::DecisionError;

/// Allowed drift of the criterion weight sum from 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Full TOPSIS working set for one ranking call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingTable {
    /// Results ordered by rank.
    pub results: Vec<RankingResult>,
    /// Weighted normalised matrix in input order.
    pub weighted: Vec<Vec<f64>>,
    pub ideal: Vec<f64>,
    pub anti_ideal: Vec<f64>,
}

impl RankingTable {
    pub fn top(&self) -> Option<&RankingResult> {
        self.results.first()
    }
}

/// Checks that the weights lie in `[0, 1]` and sum to 1.0 within tolerance.
pub fn validate_weights(criteria: &[CriterionSpec]) -> Result<(), DecisionError> {
    let sum: f64 = criteria.iter().map(|criterion| criterion.weight).sum();
    let each_valid = criteria
        .iter()
        .all(|criterion| criterion.weight.is_finite() && (0.0..=1.0).contains(&criterion.weight));

    if !each_valid || !sum.is_finite() || (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(DecisionError::InvalidWeights { sum });
    }
    Ok(())
}

/// Validates the decision matrix shape and values against `criteria`.
pub fn validate_matrix(
    alternatives: &[Alternative],
    criteria: &[CriterionSpec],
) -> Result<(), DecisionError> {
    if alternatives.is_empty() {
        return Err(DecisionError::NoAlternatives);
    }
    if criteria.is_empty() {
        return Err(DecisionError::ShapeMismatch {
            alternative_id: alternatives[0].id.clone(),
            expected: 0,
            found: alternatives[0].criteria.len(),
        });
    }
    validate_weights(criteria)?;

    let mut seen = HashSet::with_capacity(alternatives.len());
    for alternative in alternatives {
        if alternative.criteria.len() != criteria.len() {
            return Err(DecisionError::ShapeMismatch {
                alternative_id: alternative.id.clone(),
                expected: criteria.len(),
                found: alternative.criteria.len(),
            });
        }
        if let Some((_, criterion)) = alternative
            .criteria
            .iter()
            .zip(criteria)
            .find(|(value, _)| !value.is_finite())
        {
            return Err(DecisionError::InvalidValue {
                alternative_id: alternative.id.clone(),
                criterion: criterion.name.clone(),
            });
        }
        if !seen.insert(alternative.id.as_str()) {
            return Err(DecisionError::DuplicateAlternative(alternative.id.clone()));
        }
    }
    Ok(())
}

/// Rank `alternatives` over `criteria`; results are ordered by rank.
pub fn rank(
    alternatives: &[Alternative],
    criteria: &[CriterionSpec],
) -> Result<Vec<RankingResult>, DecisionError> {
    rank_detailed(alternatives, criteria).map(|table| table.results)
}

/// Like [`rank`], also returning the weighted matrix and reference points.
pub fn rank_detailed(
    alternatives: &[Alternative],
    criteria: &[CriterionSpec],
) -> Result<RankingTable, DecisionError> {
    validate_matrix(alternatives, criteria)?;

    let normalized = normalize(alternatives, criteria.len());
    let weighted: Vec<Vec<f64>> = normalized
        .iter()
        .map(|row| {
            row.iter()
                .zip(criteria)
                .map(|(value, criterion)| value * criterion.weight)
                .collect()
        })
        .collect();
    let (ideal, anti_ideal) = reference_points(&weighted, criteria);

    let mut results: Vec<RankingResult> = alternatives
        .iter()
        .zip(normalized)
        .zip(&weighted)
        .map(|((alternative, normalized_criteria), row)| {
            let distance_to_ideal = euclidean(row, &ideal);
            let distance_to_anti_ideal = euclidean(row, &anti_ideal);
            let span = distance_to_ideal + distance_to_anti_ideal;
            let closeness = if span == 0.0 {
                0.5
            } else {
                distance_to_anti_ideal / span
            };

            RankingResult {
                alternative_id: alternative.id.clone(),
                normalized_criteria,
                distance_to_ideal,
                distance_to_anti_ideal,
                closeness,
                rank: 0,
            }
        })
        .collect();

    results.sort_by(|a, b| match b.closeness.total_cmp(&a.closeness) {
        Ordering::Equal => a.alternative_id.cmp(&b.alternative_id),
        other => other,
    });
    for (index, result) in results.iter_mut().enumerate() {
        result.rank = index + 1;
    }

    if let Some(best) = results.first() {
        debug!(
            alternatives = alternatives.len(),
            criteria = criteria.len(),
            best = %best.alternative_id,
            closeness = best.closeness,
            "topsis ranking complete"
        );
    }

    Ok(RankingTable {
        results,
        weighted,
        ideal,
        anti_ideal,
    })
}

/// Vector normalisation. Each column is scaled by its largest magnitude before squaring so
/// large finite values cannot overflow the norm.
fn normalize(alternatives: &[Alternative], columns: usize) -> Vec<Vec<f64>> {
    let norms: Vec<f64> = (0..columns)
        .map(|column| {
            let scale = alternatives
                .iter()
                .map(|alternative| alternative.criteria[column].abs())
                .fold(0.0, f64::max);
            if scale == 0.0 {
                return 0.0;
            }
            let scaled_sum: f64 = alternatives
                .iter()
                .map(|alternative| (alternative.criteria[column] / scale).powi(2))
                .sum();
            scale * scaled_sum.sqrt()
        })
        .collect();

    alternatives
        .iter()
        .map(|alternative| {
            alternative
                .criteria
                .iter()
                .zip(&norms)
                .map(|(value, norm)| if *norm == 0.0 { 0.0 } else { value / norm })
                .collect()
        })
        .collect()
}

fn reference_points(weighted: &[Vec<f64>], criteria: &[CriterionSpec]) -> (Vec<f64>, Vec<f64>) {
    criteria
        .iter()
        .enumerate()
        .map(|(column, criterion)| {
            let (min, max) = weighted.iter().map(|row| row[column]).fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(min, max), value| (min.min(value), max.max(value)),
            );
            match criterion.direction {
                Direction::Benefit => (max, min),
                Direction::Cost => (min, max),
            }
        })
        .unzip()
}

pub(crate) fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
