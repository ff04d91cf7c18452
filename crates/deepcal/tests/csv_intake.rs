use std::io::Write;

use deepcal::decision::{AlternativeCsv, CriterionSpec, IntakeError, RecommendationEngine};

const QUOTES: &str = "\
id,name,cost,time,reliability,risk
kn,Kuehne + Nagel,\"$3,000\",5,0.90,0.10
bl,Bolloré,1800,12..16,0.88,0.12
sg,Siginon,2400,8,?,0.22
";

#[test]
fn csv_quotes_flow_into_a_recommendation() {
    let criteria = CriterionSpec::logistics_defaults();
    let intake = AlternativeCsv::from_reader(QUOTES.as_bytes(), &criteria).expect("csv parses");

    assert_eq!(intake.alternatives.len(), 3);
    assert_eq!(intake.observations.len(), 2);
    assert_eq!(intake.alternatives[1].criteria[1], 14.0);

    let recommendation = RecommendationEngine::default()
        .recommend(&intake.alternatives, &intake.observations, &[], &criteria)
        .expect("recommendation");

    assert_eq!(recommendation.whitened.len(), 2);
    let reliability = recommendation
        .whitened
        .iter()
        .find(|entry| entry.alternative_id == "sg")
        .expect("sg reliability whitened");
    assert!((reliability.value.estimated_value - 0.89).abs() < 1e-9);
    assert!(reliability.value.confidence > 0.0);
}

#[test]
fn csv_reads_from_disk() {
    let path = std::env::temp_dir().join(format!("deepcal-quotes-{}.csv", std::process::id()));
    let mut file = std::fs::File::create(&path).expect("create csv");
    file.write_all(QUOTES.as_bytes()).expect("write csv");
    drop(file);

    let intake = AlternativeCsv::from_path(&path, &CriterionSpec::logistics_defaults())
        .expect("csv from disk");
    assert_eq!(intake.alternatives[0].criteria[0], 3000.0);
    std::fs::remove_file(path).ok();
}

#[test]
fn missing_file_is_an_io_error() {
    let result = AlternativeCsv::from_path(
        "/nonexistent/deepcal/quotes.csv",
        &CriterionSpec::logistics_defaults(),
    );
    assert!(matches!(result, Err(IntakeError::Io(_))));
}
