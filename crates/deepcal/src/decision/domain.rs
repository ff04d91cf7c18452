use serde::{Deserialize, Serialize};

use super::error::DecisionError;

/// Symbolic statement about an alternative's fitness, scored with neutrosophic values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub statement_text: String,
    pub truth: f64,
    pub indeterminacy: f64,
    pub falsity: f64,
    pub weight: f64,
    #[serde(default)]
    pub category: String,
    /// Restricts the rule to a single alternative; global when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_id: Option<String>,
}

impl Rule {
    pub fn new(
        id: impl Into<String>,
        statement_text: impl Into<String>,
        truth: f64,
        indeterminacy: f64,
        falsity: f64,
    ) -> Self {
        Self {
            id: id.into(),
            statement_text: statement_text.into(),
            truth,
            indeterminacy,
            falsity,
            weight: 1.0,
            category: String::new(),
            alternative_id: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn for_alternative(mut self, alternative_id: impl Into<String>) -> Self {
        self.alternative_id = Some(alternative_id.into());
        self
    }

    /// `truth - indeterminacy - falsity`; higher is more trustworthy.
    pub fn confidence(&self) -> f64 {
        self.truth - self.indeterminacy - self.falsity
    }

    pub fn neutrosophic_sum(&self) -> f64 {
        self.truth + self.indeterminacy + self.falsity
    }

    /// Truth, indeterminacy, falsity and weight must each be finite and lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), DecisionError> {
        let components = [
            ("truth", self.truth),
            ("indeterminacy", self.indeterminacy),
            ("falsity", self.falsity),
            ("weight", self.weight),
        ];
        for (component, value) in components {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(DecisionError::InvalidRule {
                    rule_id: self.id.clone(),
                    reason: format!("{component} must lie in [0, 1], found {value}"),
                });
            }
        }
        Ok(())
    }

    pub fn applies_to(&self, alternative_id: &str) -> bool {
        self.alternative_id
            .as_deref()
            .map(|target| target == alternative_id)
            .unwrap_or(true)
    }
}

/// Interpolation strategy used to whiten a grey observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhiteningMethod {
    #[default]
    Linear,
    Exponential,
    Logarithmic,
    Fusion,
}

impl WhiteningMethod {
    pub fn label(&self) -> &'static str {
        match self {
            WhiteningMethod::Linear => "linear",
            WhiteningMethod::Exponential => "exponential",
            WhiteningMethod::Logarithmic => "logarithmic",
            WhiteningMethod::Fusion => "fusion",
        }
    }
}

/// Summary of the contextual prior a caller supplies for a missing value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prior {
    pub mean: f64,
    pub variance: f64,
}

impl Prior {
    pub fn new(mean: f64, variance: f64) -> Self {
        Self { mean, variance }
    }

    /// Uniform prior over an interval grey number `[lower, upper]`.
    pub fn from_range(lower: f64, upper: f64) -> Self {
        let (lower, upper) = if lower <= upper {
            (lower, upper)
        } else {
            (upper, lower)
        };
        let width = upper - lower;
        Self {
            mean: (lower + upper) / 2.0,
            variance: width * width / 12.0,
        }
    }

    /// Sample mean and population variance of the known values, if any.
    pub fn from_samples(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values
            .iter()
            .map(|value| (value - mean) * (value - mean))
            .sum::<f64>()
            / n;
        Some(Self { mean, variance })
    }

    pub fn is_finite(&self) -> bool {
        self.mean.is_finite() && self.variance.is_finite() && self.variance >= 0.0
    }
}

/// Raw, possibly missing, numeric observation for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UncertainObservation {
    pub field_name: String,
    pub raw_value: Option<f64>,
    #[serde(default)]
    pub method: WhiteningMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior: Option<Prior>,
}

impl UncertainObservation {
    pub fn known(field_name: impl Into<String>, value: f64) -> Self {
        Self {
            field_name: field_name.into(),
            raw_value: Some(value),
            method: WhiteningMethod::Linear,
            prior: None,
        }
    }

    pub fn missing(field_name: impl Into<String>, method: WhiteningMethod) -> Self {
        Self {
            field_name: field_name.into(),
            raw_value: None,
            method,
            prior: None,
        }
    }

    pub fn with_prior(mut self, prior: Prior) -> Self {
        self.prior = Some(prior);
        self
    }
}

/// Point estimate produced from an observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitenedValue {
    pub field_name: String,
    pub estimated_value: f64,
    pub confidence: f64,
    pub method_used: WhiteningMethod,
}

impl WhitenedValue {
    pub fn is_resolved(&self) -> bool {
        self.confidence > 0.0
    }
}

/// Candidate being ranked; `criteria[k]` lines up with `CriterionSpec[k]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub id: String,
    pub name: String,
    pub criteria: Vec<f64>,
}

impl Alternative {
    pub fn new(id: impl Into<String>, name: impl Into<String>, criteria: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            criteria,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Benefit,
    Cost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionSpec {
    pub name: String,
    pub weight: f64,
    pub direction: Direction,
}

impl CriterionSpec {
    pub fn benefit(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            direction: Direction::Benefit,
        }
    }

    pub fn cost(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            direction: Direction::Cost,
        }
    }

    /// Default freight criteria: cost, time, reliability, risk.
    pub fn logistics_defaults() -> Vec<Self> {
        vec![
            Self::cost("cost", 0.25),
            Self::cost("time", 0.30),
            Self::benefit("reliability", 0.25),
            Self::cost("risk", 0.20),
        ]
    }
}

/// TOPSIS outcome for one alternative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingResult {
    pub alternative_id: String,
    pub normalized_criteria: Vec<f64>,
    pub distance_to_ideal: f64,
    pub distance_to_anti_ideal: f64,
    pub closeness: f64,
    pub rank: usize,
}

/// Observation addressed to one alternative; `fieldName` names the criterion it fills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionObservation {
    pub alternative_id: String,
    pub observation: UncertainObservation,
}

impl CriterionObservation {
    pub fn new(alternative_id: impl Into<String>, observation: UncertainObservation) -> Self {
        Self {
            alternative_id: alternative_id.into(),
            observation,
        }
    }
}
