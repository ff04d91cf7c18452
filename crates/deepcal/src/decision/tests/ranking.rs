use super::common::*;
use crate::decision::domain::{Alternative, CriterionSpec};
use crate::decision::error::DecisionError;
use crate::decision::topsis::{rank, rank_detailed};

#[test]
fn three_forwarders_rank_deterministically() {
    let ranked = rank(&forwarders(), &freight_criteria()).expect("valid matrix");

    let order: Vec<(&str, usize)> = ranked
        .iter()
        .map(|result| (result.alternative_id.as_str(), result.rank))
        .collect();
    assert_eq!(order, vec![("A", 1), ("C", 2), ("B", 3)]);

    approx(ranked[0].closeness, 0.660390, 1e-6);
    approx(ranked[1].closeness, 0.591353, 1e-6);
    approx(ranked[2].closeness, 0.363304, 1e-6);
    approx(ranked[0].distance_to_ideal, 0.098995, 1e-6);
    approx(ranked[0].distance_to_anti_ideal, 0.192501, 1e-6);
}

#[test]
fn ranking_twice_is_identical() {
    let first = rank(&forwarders(), &freight_criteria()).expect("first run");
    let second = rank(&forwarders(), &freight_criteria()).expect("second run");
    assert_eq!(first, second);
}

#[test]
fn normalized_criteria_are_unweighted_unit_columns() {
    let ranked = rank(&forwarders(), &freight_criteria()).expect("valid matrix");
    for column in 0..4 {
        let squares: f64 = ranked
            .iter()
            .map(|result| result.normalized_criteria[column].powi(2))
            .sum();
        approx(squares, 1.0, 1e-12);
    }
}

#[test]
fn raising_a_benefit_value_never_lowers_closeness() {
    let criteria = freight_criteria();
    for target in ["A", "B", "C"] {
        let mut previous = f64::NEG_INFINITY;
        for reliability in [0.5, 0.7, 0.8, 0.9, 0.95, 1.0] {
            let mut alternatives = forwarders();
            alternatives
                .iter_mut()
                .filter(|alternative| alternative.id == target)
                .for_each(|alternative| alternative.criteria[2] = reliability);

            let ranked = rank(&alternatives, &criteria).expect("valid matrix");
            let closeness = ranked
                .iter()
                .find(|result| result.alternative_id == target)
                .map(|result| result.closeness)
                .expect("target ranked");
            assert!(closeness >= previous - 1e-12, "{target} dropped at {reliability}");
            previous = closeness;
        }
    }
}

#[test]
fn single_alternative_is_rank_one_with_midpoint_closeness() {
    let ranked = rank(&forwarders()[..1], &freight_criteria()).expect("single row");
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].rank, 1);
    assert_eq!(ranked[0].closeness, 0.5);
}

#[test]
fn identical_rows_tie_and_break_by_id() {
    let alternatives = vec![
        Alternative::new("zeta", "Zeta", vec![100.0, 3.0]),
        Alternative::new("alpha", "Alpha", vec![100.0, 3.0]),
    ];
    let criteria = vec![CriterionSpec::cost("cost", 0.5), CriterionSpec::cost("time", 0.5)];

    let ranked = rank(&alternatives, &criteria).expect("valid matrix");
    assert_eq!(ranked[0].alternative_id, "alpha");
    assert_eq!(ranked[1].alternative_id, "zeta");
    assert_eq!(ranked[0].closeness, ranked[1].closeness);
    assert_eq!((ranked[0].rank, ranked[1].rank), (1, 2));
}

#[test]
fn nearly_identical_rows_still_separate() {
    let alternatives = vec![
        Alternative::new("a", "A", vec![1.0]),
        Alternative::new("b", "B", vec![1.0 + f64::EPSILON]),
    ];
    let criteria = vec![CriterionSpec::benefit("reliability", 1.0)];

    let ranked = rank(&alternatives, &criteria).expect("valid matrix");
    assert_eq!(ranked[0].alternative_id, "b");
    assert_eq!(ranked[0].closeness, 1.0);
    assert_eq!(ranked[1].closeness, 0.0);
}

#[test]
fn very_large_values_normalize_without_overflow() {
    let alternatives = vec![
        Alternative::new("A", "A", vec![1e200, 5.0]),
        Alternative::new("B", "B", vec![2e200, 5.0]),
    ];
    let criteria = vec![
        CriterionSpec::cost("cost", 0.5),
        CriterionSpec::cost("time", 0.5),
    ];

    let table = rank_detailed(&alternatives, &criteria).expect("valid matrix");
    let root_five = 5.0_f64.sqrt();
    let a = table
        .results
        .iter()
        .find(|result| result.alternative_id == "A")
        .expect("A ranked");
    approx(a.normalized_criteria[0], 1.0 / root_five, 1e-12);
    assert_eq!(table.top().map(|top| top.alternative_id.as_str()), Some("A"));
    assert_eq!(table.results[0].closeness, 1.0);
}

#[test]
fn all_zero_column_normalizes_to_zero() {
    let alternatives = vec![
        Alternative::new("A", "A", vec![0.0, 10.0]),
        Alternative::new("B", "B", vec![0.0, 20.0]),
    ];
    let criteria = vec![
        CriterionSpec::benefit("surcharge", 0.5),
        CriterionSpec::cost("cost", 0.5),
    ];

    let ranked = rank(&alternatives, &criteria).expect("zero column is valid");
    assert!(ranked
        .iter()
        .all(|result| result.normalized_criteria[0] == 0.0));
    assert_eq!(ranked[0].alternative_id, "A");
    assert_eq!(ranked[0].closeness, 1.0);
}

#[test]
fn detailed_table_exposes_reference_points() {
    let table = rank_detailed(&forwarders(), &freight_criteria()).expect("valid matrix");
    assert_eq!(table.weighted.len(), 3);
    assert_eq!(table.ideal.len(), 4);
    // cost column: ideal is the smallest weighted value, reliability: the largest
    let cost_column: Vec<f64> = table.weighted.iter().map(|row| row[0]).collect();
    let reliability_column: Vec<f64> = table.weighted.iter().map(|row| row[2]).collect();
    assert_eq!(table.ideal[0], cost_column.iter().copied().fold(f64::INFINITY, f64::min));
    assert_eq!(
        table.ideal[2],
        reliability_column.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    );
    assert_eq!(table.top().map(|top| top.alternative_id.as_str()), Some("A"));
}

#[test]
fn rejects_empty_alternatives() {
    assert_eq!(
        rank(&[], &freight_criteria()),
        Err(DecisionError::NoAlternatives)
    );
}

#[test]
fn rejects_weights_that_do_not_sum_to_one() {
    let mut criteria = freight_criteria();
    criteria[0].weight = 0.45;
    match rank(&forwarders(), &criteria) {
        Err(DecisionError::InvalidWeights { sum }) => approx(sum, 1.1, 1e-9),
        other => panic!("expected invalid weights, got {other:?}"),
    }
}

#[test]
fn accepts_weight_drift_within_tolerance() {
    let mut criteria = freight_criteria();
    criteria[3].weight += 5e-7;
    assert!(rank(&forwarders(), &criteria).is_ok());
}

#[test]
fn rejects_negative_weight_even_when_sum_is_one() {
    let criteria = vec![
        CriterionSpec::cost("cost", 1.2),
        CriterionSpec::cost("time", -0.2),
    ];
    let alternatives = vec![Alternative::new("A", "A", vec![1.0, 2.0])];
    assert!(matches!(
        rank(&alternatives, &criteria),
        Err(DecisionError::InvalidWeights { .. })
    ));
}

#[test]
fn rejects_shape_mismatch() {
    let mut alternatives = forwarders();
    alternatives[1].criteria.pop();
    assert_eq!(
        rank(&alternatives, &freight_criteria()),
        Err(DecisionError::ShapeMismatch {
            alternative_id: "B".to_string(),
            expected: 4,
            found: 3,
        })
    );
}

#[test]
fn rejects_non_finite_values_and_duplicate_ids() {
    let mut alternatives = forwarders();
    alternatives[2].criteria[1] = f64::NAN;
    assert_eq!(
        rank(&alternatives, &freight_criteria()),
        Err(DecisionError::InvalidValue {
            alternative_id: "C".to_string(),
            criterion: "time".to_string(),
        })
    );

    let mut alternatives = forwarders();
    alternatives[2].id = "A".to_string();
    assert_eq!(
        rank(&alternatives, &freight_criteria()),
        Err(DecisionError::DuplicateAlternative("A".to_string()))
    );
}
