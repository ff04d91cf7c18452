use std::f64::consts::E;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::decision::domain::{Prior, UncertainObservation, WhitenedValue, WhiteningMethod};

/// Inferred values never claim more confidence than this.
pub const MAX_INFERRED_CONFIDENCE: f64 = 0.95;

const LINEAR_FACTOR: f64 = 0.90;
const EXPONENTIAL_FACTOR: f64 = 0.80;
const LOGARITHMIC_FACTOR: f64 = 0.70;

/// Fusion weights: linear, exponential, logarithmic.
const FUSION_WEIGHTS: [f64; 3] = [0.6, 0.3, 0.1];

/// Tuning for the whitening functions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreyParameters {
    /// Linear slope applied to the prior mean.
    pub alpha: f64,
    /// Linear offset applied to the prior mean.
    pub beta: f64,
    /// Decay rate of the exponential confidence discount.
    pub lambda: f64,
    /// Saturation scale for the logarithmic discount.
    pub scale: f64,
    /// Logarithm base for the logarithmic discount.
    pub base: f64,
    /// Distinguishing coefficient for grey relational analysis.
    pub resolution: f64,
}

impl Default for GreyParameters {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 0.0,
            lambda: 0.1,
            scale: 1.0,
            base: E,
            resolution: 0.4,
        }
    }
}

/// Fallback estimate used when a field has neither a raw value nor a prior.
pub fn field_default(field_name: &str) -> f64 {
    match field_name.trim().to_ascii_lowercase().as_str() {
        "reliability" | "risk" => 0.5,
        _ => 0.0,
    }
}

/// Resolves grey observations into point estimates with an attached confidence.
#[derive(Debug, Clone, Default)]
pub struct GreyWhitener {
    parameters: GreyParameters,
}

impl GreyWhitener {
    pub fn new(parameters: GreyParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &GreyParameters {
        &self.parameters
    }

    /// Whiten `observation`, optionally overriding the method it carries.
    pub fn whiten(
        &self,
        observation: &UncertainObservation,
        method: Option<WhiteningMethod>,
    ) -> WhitenedValue {
        let field_name = observation.field_name.clone();
        let method = method.unwrap_or(observation.method);

        if let Some(raw) = observation.raw_value.filter(|value| value.is_finite()) {
            return WhitenedValue {
                field_name,
                estimated_value: raw,
                confidence: 1.0,
                method_used: WhiteningMethod::Linear,
            };
        }

        let Some(prior) = observation.prior.filter(Prior::is_finite) else {
            return unresolved(field_name, method);
        };

        let (estimate, confidence) = match method {
            WhiteningMethod::Linear => self.linear(&prior),
            WhiteningMethod::Exponential => self.exponential(&prior),
            WhiteningMethod::Logarithmic => self.logarithmic(&prior),
            WhiteningMethod::Fusion => self.fusion(&prior),
        };

        enforce_inferred_bounds(field_name, estimate, confidence, method)
    }

    fn linear(&self, prior: &Prior) -> (f64, f64) {
        let estimate = self.parameters.alpha * prior.mean + self.parameters.beta;
        (estimate, LINEAR_FACTOR * dispersion_factor(prior))
    }

    fn exponential(&self, prior: &Prior) -> (f64, f64) {
        let cv = coefficient_of_variation(prior);
        let discount = (-self.parameters.lambda.max(0.0) * cv).exp();
        (
            prior.mean,
            EXPONENTIAL_FACTOR * dispersion_factor(prior) * discount,
        )
    }

    fn logarithmic(&self, prior: &Prior) -> (f64, f64) {
        let cv = coefficient_of_variation(prior);
        let base = self.parameters.base.max(1.0 + f64::EPSILON);
        let saturation = (1.0 + self.parameters.scale.max(0.0) * cv).ln() / (1.0 + base).ln();
        (
            prior.mean,
            LOGARITHMIC_FACTOR * dispersion_factor(prior) / (1.0 + saturation),
        )
    }

    fn fusion(&self, prior: &Prior) -> (f64, f64) {
        let parts = [
            self.linear(prior),
            self.exponential(prior),
            self.logarithmic(prior),
        ];
        let estimate = parts
            .iter()
            .zip(FUSION_WEIGHTS)
            .map(|((value, _), weight)| value * weight)
            .sum();
        let confidence = parts
            .iter()
            .map(|(_, confidence)| confidence)
            .product::<f64>()
            .min(MAX_INFERRED_CONFIDENCE);
        (estimate, confidence)
    }
}

fn coefficient_of_variation(prior: &Prior) -> f64 {
    let spread = prior.variance.max(0.0).sqrt();
    if prior.mean.abs() < 1e-9 {
        spread
    } else {
        spread / prior.mean.abs()
    }
}

fn dispersion_factor(prior: &Prior) -> f64 {
    1.0 / (1.0 + coefficient_of_variation(prior))
}

fn unresolved(field_name: String, method: WhiteningMethod) -> WhitenedValue {
    WhitenedValue {
        estimated_value: field_default(&field_name),
        field_name,
        confidence: 0.0,
        method_used: method,
    }
}

fn enforce_inferred_bounds(
    field_name: String,
    estimate: f64,
    confidence: f64,
    method: WhiteningMethod,
) -> WhitenedValue {
    if !estimate.is_finite() || !confidence.is_finite() {
        warn!(field = %field_name, method = method.label(), "whitening produced a non-finite result");
        return unresolved(field_name, method);
    }

    let bounded = confidence.clamp(0.0, MAX_INFERRED_CONFIDENCE);
    if bounded != confidence {
        warn!(
            field = %field_name,
            method = method.label(),
            confidence,
            "inferred confidence out of bounds; clamped"
        );
    }

    WhitenedValue {
        field_name,
        estimated_value: estimate,
        confidence: bounded,
        method_used: method,
    }
}
