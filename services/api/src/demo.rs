use crate::infra::{default_rules, load_rules};
use chrono::Local;
use clap::Args;
use deepcal::config::{load_engine_config, AppConfig};
use deepcal::decision::neutrosophic::{admit, weights};
use deepcal::decision::topsis;
use deepcal::decision::{
    AdmissionThresholds, Alternative, AlternativeCsv, CriterionSpec, EngineConfig, Recommendation,
    RecommendationEngine, Rule,
};
use deepcal::error::AppError;
use deepcal::telemetry;
use std::io::Cursor;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Quote sheet with `id,name,<criteria…>` columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Engine configuration JSON (defaults to DEEPCAL_ENGINE_CONFIG or built-in defaults)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Rule set JSON (defaults to DEEPCAL_RULES or the built-in corridor rules)
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Criterion specification JSON (defaults to cost, time, reliability, risk)
    #[arg(long)]
    pub(crate) criteria: Option<PathBuf>,
    /// Print the recommendation as JSON instead of a report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the incomplete quote sheet portion of the demo.
    #[arg(long)]
    pub(crate) skip_grey: bool,
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        csv,
        config,
        rules,
        criteria,
        json,
    } = args;

    let app_config = AppConfig::load()?;
    telemetry::init(&app_config.telemetry)?;

    let engine_config = match config {
        Some(path) => load_engine_config(path)?,
        None => app_config.engine.clone(),
    };
    let rules = match rules.or(app_config.rules_path) {
        Some(path) => load_rules(&path)?,
        None => default_rules(),
    };
    let criteria = match criteria {
        Some(path) => load_criteria(&path)?,
        None => CriterionSpec::logistics_defaults(),
    };

    let (alternatives, recommendation) = rank_quotes(&csv, engine_config, &rules, &criteria)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
    } else {
        println!("Quote sheet: {}", csv.display());
        render_recommendation(&recommendation, &alternatives, &criteria);
    }
    Ok(())
}

pub(crate) fn rank_quotes(
    csv: &Path,
    config: EngineConfig,
    rules: &[Rule],
    criteria: &[CriterionSpec],
) -> Result<(Vec<Alternative>, Recommendation), AppError> {
    let intake = AlternativeCsv::from_path(csv, criteria)?;
    let recommendation = RecommendationEngine::new(config).recommend(
        &intake.alternatives,
        &intake.observations,
        rules,
        criteria,
    )?;
    Ok((intake.alternatives, recommendation))
}

fn load_criteria(path: &Path) -> Result<Vec<CriterionSpec>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { skip_grey } = args;

    println!("DeepCAL decision demo");
    let alternatives = demo_forwarders();
    let criteria = demo_criteria();

    println!("\nTOPSIS over cost, time, reliability and risk");
    for result in topsis::rank(&alternatives, &criteria)? {
        println!(
            "- #{} {}: C* {:.6} (S+ {:.6}, S- {:.6})",
            result.rank,
            result.alternative_id,
            result.closeness,
            result.distance_to_ideal,
            result.distance_to_anti_ideal
        );
    }

    let rules = demo_rules();
    let admitted = admit(&rules, &AdmissionThresholds::default());
    let rule_weights = weights(&admitted);
    println!(
        "\nNeutrosophic admission: {}/{} rules cleared the default thresholds",
        admitted.len(),
        rules.len()
    );
    for (rule, weight) in admitted.iter().zip(&rule_weights) {
        println!(
            "- {} (T {:.2} / I {:.2} / F {:.2}) weight {:.3}",
            rule.statement_text, rule.truth, rule.indeterminacy, rule.falsity, weight
        );
    }

    let engine = RecommendationEngine::default();
    let recommendation = engine.recommend(&alternatives, &[], &rules, &criteria)?;
    println!("\nRecommendation with rule support");
    render_recommendation(&recommendation, &alternatives, &criteria);

    if skip_grey {
        return Ok(());
    }

    println!("\nIncomplete quote sheet (grey cells whitened)");
    let intake = AlternativeCsv::from_reader(Cursor::new(GREY_QUOTES.as_bytes()), &criteria)?;
    let recommendation =
        engine.recommend(&intake.alternatives, &intake.observations, &rules, &criteria)?;
    render_recommendation(&recommendation, &intake.alternatives, &criteria);

    Ok(())
}

const GREY_QUOTES: &str = "\
id,name,cost,time,reliability,risk
A,Kuehne + Nagel,3000,5,0.90,0.10
B,Bolloré,1650..1950,14,0.88,?
C,Siginon,2400,7..9,,0.22
";

fn demo_forwarders() -> Vec<Alternative> {
    vec![
        Alternative::new("A", "Kuehne + Nagel", vec![3000.0, 5.0, 0.9, 0.1]),
        Alternative::new("B", "Bolloré", vec![1800.0, 14.0, 0.88, 0.12]),
        Alternative::new("C", "Siginon", vec![2400.0, 8.0, 0.78, 0.22]),
    ]
}

fn demo_criteria() -> Vec<CriterionSpec> {
    vec![
        CriterionSpec::cost("cost", 0.35),
        CriterionSpec::cost("time", 0.35),
        CriterionSpec::benefit("reliability", 0.2),
        CriterionSpec::cost("risk", 0.1),
    ]
}

fn demo_rules() -> Vec<Rule> {
    let mut rules = vec![Rule::new(
        "a-on-time",
        "Kuehne + Nagel delivers on time on the Mombasa corridor",
        0.9,
        0.05,
        0.02,
    )
    .for_alternative("A")];
    rules.extend(default_rules());
    rules.push(Rule::new(
        "b-rate-lock",
        "Bolloré honours locked rates through peak season",
        0.78,
        0.1,
        0.04,
    )
    .for_alternative("B"));
    rules
}

pub(crate) fn render_recommendation(
    recommendation: &Recommendation,
    alternatives: &[Alternative],
    criteria: &[CriterionSpec],
) {
    println!("Generated {}", Local::now().format("%Y-%m-%d %H:%M"));
    let name_of = |id: &str| {
        alternatives
            .iter()
            .find(|alternative| alternative.id == id)
            .map(|alternative| alternative.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    println!("Ranking");
    for result in &recommendation.ranked {
        println!(
            "- #{} {} ({}): C* {:.4}",
            result.rank,
            name_of(&result.alternative_id),
            result.alternative_id,
            result.closeness
        );
    }

    let top = &recommendation.top_choice;
    let values: Vec<String> = criteria
        .iter()
        .zip(&top.criteria)
        .map(|(criterion, value)| format!("{} {:.2}", criterion.name, value))
        .collect();
    println!(
        "Top choice: {} | confidence {:.0}% | {}",
        top.name,
        recommendation.confidence * 100.0,
        values.join(", ")
    );

    println!("Reasons");
    for reason in &recommendation.reasons {
        println!("- {}", reason);
    }

    if !recommendation.whitened.is_empty() {
        println!("Whitened cells");
        for entry in &recommendation.whitened {
            println!(
                "- {}/{}: {:.2} via {} (confidence {:.2})",
                entry.alternative_id,
                entry.value.field_name,
                entry.value.estimated_value,
                entry.value.method_used.label(),
                entry.value.confidence
            );
        }
    }

    if recommendation.warnings.is_empty() {
        println!("Warnings: none");
    } else {
        println!("Warnings");
        for warning in &recommendation.warnings {
            println!("- {}", warning.summary());
        }
    }
}
