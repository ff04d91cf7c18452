use crate::decision::error::DecisionError;

/// Grey relational grade of `comparison` against `reference`, in `(0, 1]`.
///
/// Averages the coefficients `(Δmin + ρΔmax) / (Δk + ρΔmax)` where `ρ` is the distinguishing
/// `resolution`. Identical sequences grade 1.0.
pub fn grey_relation(
    reference: &[f64],
    comparison: &[f64],
    resolution: f64,
) -> Result<f64, DecisionError> {
    if reference.len() != comparison.len() {
        return Err(DecisionError::ShapeMismatch {
            alternative_id: "comparison".to_string(),
            expected: reference.len(),
            found: comparison.len(),
        });
    }
    if reference.is_empty() {
        return Ok(1.0);
    }

    let differences: Vec<f64> = reference
        .iter()
        .zip(comparison)
        .map(|(r, c)| (r - c).abs())
        .collect();
    let min_diff = differences.iter().copied().fold(f64::INFINITY, f64::min);
    let max_diff = differences.iter().copied().fold(0.0_f64, f64::max);

    if max_diff <= f64::EPSILON {
        return Ok(1.0);
    }

    let rho_max = resolution.clamp(0.0, 1.0) * max_diff;
    let total: f64 = differences
        .iter()
        .map(|diff| {
            let denominator = diff + rho_max;
            if denominator <= f64::EPSILON {
                1.0
            } else {
                (min_diff + rho_max) / denominator
            }
        })
        .sum();

    Ok(total / differences.len() as f64)
}
