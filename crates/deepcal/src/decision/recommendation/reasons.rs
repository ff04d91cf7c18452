use crate::decision::domain::{Alternative, CriterionSpec};
use crate::decision::grey::grey_relation;
use crate::decision::neutrosophic::RuleAdmission;
use crate::decision::topsis::RankingTable;

use super::blend::ResolvedObservation;

pub(crate) struct ReasonInputs<'a> {
    pub alternatives: &'a [Alternative],
    pub criteria: &'a [CriterionSpec],
    pub table: &'a RankingTable,
    pub admission: &'a RuleAdmission,
    pub whitened: &'a [ResolvedObservation],
    pub blended: Option<(&'a str, usize, f64)>,
    pub resolution: f64,
}

pub(crate) fn explain(inputs: &ReasonInputs<'_>) -> Vec<String> {
    let mut reasons = Vec::new();
    let Some(top) = inputs.table.top() else {
        return reasons;
    };

    let name_of = |id: &str| {
        inputs
            .alternatives
            .iter()
            .find(|alternative| alternative.id == id)
            .map(|alternative| alternative.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    reasons.push(format!(
        "{} ranked #1 of {} with closeness {:.3}",
        name_of(&top.alternative_id),
        inputs.table.results.len(),
        top.closeness
    ));

    if let Some(runner_up) = inputs.table.results.get(1) {
        reasons.push(format!(
            "leads {} by {:.3} closeness",
            name_of(&runner_up.alternative_id),
            top.closeness - runner_up.closeness
        ));
    }

    if let Some(row) = inputs
        .alternatives
        .iter()
        .position(|alternative| alternative.id == top.alternative_id)
    {
        let weighted = &inputs.table.weighted[row];
        let leading: Vec<&str> = inputs
            .criteria
            .iter()
            .enumerate()
            .filter(|(column, _)| (weighted[*column] - inputs.table.ideal[*column]).abs() <= 1e-12)
            .map(|(_, criterion)| criterion.name.as_str())
            .collect();
        if !leading.is_empty() {
            reasons.push(format!("best available on {}", leading.join(", ")));
        }

        if let Ok(grade) = grey_relation(&inputs.table.ideal, weighted, inputs.resolution) {
            reasons.push(format!("grey relational grade to the ideal point {grade:.3}"));
        }
    }

    if inputs.admission.is_empty() {
        reasons.push(format!(
            "0/{} rules admitted; ranking relies on criteria alone",
            inputs.admission.evaluated
        ));
    } else {
        reasons.push(format!(
            "{}/{} rules admitted (rule-set confidence {:.2})",
            inputs.admission.admitted.len(),
            inputs.admission.evaluated,
            inputs.admission.confidence()
        ));
    }

    if !inputs.whitened.is_empty() {
        let mean = inputs
            .whitened
            .iter()
            .map(|entry| entry.value.confidence)
            .sum::<f64>()
            / inputs.whitened.len() as f64;
        reasons.push(format!(
            "{} observation(s) whitened with mean confidence {:.2}",
            inputs.whitened.len(),
            mean
        ));
    }

    if let Some((criterion, adjusted, influence)) = inputs.blended {
        if adjusted > 0 {
            reasons.push(format!(
                "{criterion} blended with rule support for {adjusted} alternative(s) at influence {influence:.2}"
            ));
        }
    }

    reasons
}
