mod blend;
mod config;
mod reasons;

pub use blend::ResolvedObservation;
pub use config::{DistanceMetric, EngineConfig, NormalizationMethod};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{Alternative, CriterionObservation, CriterionSpec, RankingResult, Rule};
use super::error::{DecisionError, DecisionWarning};
use super::grey::{GreyParameters, GreyWhitener, MAX_INFERRED_CONFIDENCE};
use super::neutrosophic::RuleAdmission;
use super::topsis;
use blend::{apply_whitening, blend_rule_support, criterion_index, locate_observations};
use reasons::{explain, ReasonInputs};

/// Rule-set confidence assumed when no rule survives admission.
const UNCORROBORATED_RULE_CONFIDENCE: f64 = 0.5;

/// Stateless engine composing rule admission, whitening and TOPSIS ranking.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: EngineConfig,
    whitener: GreyWhitener,
}

impl RecommendationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            whitener: GreyWhitener::default(),
        }
    }

    pub fn with_grey_parameters(mut self, parameters: GreyParameters) -> Self {
        self.whitener = GreyWhitener::new(parameters);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn whitener(&self) -> &GreyWhitener {
        &self.whitener
    }

    pub fn recommend(
        &self,
        alternatives: &[Alternative],
        observations: &[CriterionObservation],
        rules: &[Rule],
        criteria: &[CriterionSpec],
    ) -> Result<Recommendation, DecisionError> {
        self.config.validate()?;
        topsis::validate_matrix(alternatives, criteria)?;
        rules.iter().try_for_each(Rule::validate)?;
        let targets = locate_observations(alternatives, criteria, observations)?;

        let mut prepared = alternatives.to_vec();

        let (whitened, mut warnings) =
            apply_whitening(&self.whitener, &mut prepared, observations, &targets);

        let admission = RuleAdmission::evaluate(rules, &self.config.thresholds());
        let influence = if admission.is_empty() {
            warn!(
                evaluated = admission.evaluated,
                "no rules admitted; rule influence forced to 0"
            );
            warnings.insert(0, DecisionWarning::LowConfidenceNoRulesAdmitted);
            0.0
        } else {
            self.config.rule_influence
        };

        let blended = self
            .config
            .blend_criterion
            .as_deref()
            .and_then(|name| criterion_index(criteria, name))
            .map(|column| {
                let criterion = &criteria[column];
                let adjusted =
                    blend_rule_support(&mut prepared, criterion, column, &admission, influence);
                (criterion.name.as_str(), adjusted, influence)
            });

        let table = topsis::rank_detailed(&prepared, criteria)?;
        let top = table.top().ok_or(DecisionError::NoAlternatives)?;
        let top_choice = prepared
            .iter()
            .find(|alternative| alternative.id == top.alternative_id)
            .cloned()
            .ok_or(DecisionError::NoAlternatives)?;

        let whitening_confidence = if whitened.is_empty() {
            1.0
        } else {
            whitened
                .iter()
                .map(|entry| entry.value.confidence)
                .sum::<f64>()
                / whitened.len() as f64
        };
        let rule_confidence = if admission.is_empty() {
            UNCORROBORATED_RULE_CONFIDENCE
        } else {
            admission.confidence()
        };
        let confidence = (whitening_confidence * rule_confidence * top.closeness)
            .clamp(0.0, MAX_INFERRED_CONFIDENCE);

        let reasons = explain(&ReasonInputs {
            alternatives: &prepared,
            criteria,
            table: &table,
            admission: &admission,
            whitened: &whitened,
            blended,
            resolution: self.whitener.parameters().resolution,
        });

        debug!(
            top = %top_choice.id,
            confidence,
            warnings = warnings.len(),
            "recommendation ready"
        );

        Ok(Recommendation {
            ranked: table.results,
            top_choice,
            confidence,
            reasons,
            warnings,
            whitened,
            admitted_rules: admission.admitted.iter().map(|rule| rule.id.clone()).collect(),
            rule_weights: admission.weights,
            rule_influence: influence,
        })
    }
}

/// Ranked, explained outcome of a recommendation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub ranked: Vec<RankingResult>,
    /// Winning alternative with the criteria values it was ranked on.
    pub top_choice: Alternative,
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub warnings: Vec<DecisionWarning>,
    pub whitened: Vec<ResolvedObservation>,
    pub admitted_rules: Vec<String>,
    pub rule_weights: Vec<f64>,
    /// Rule influence actually applied.
    pub rule_influence: f64,
}

impl Recommendation {
    pub fn has_warning(&self, warning: &DecisionWarning) -> bool {
        self.warnings.contains(warning)
    }
}
