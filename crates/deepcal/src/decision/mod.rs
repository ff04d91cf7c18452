//! Freight decision engine: neutrosophic rule admission, grey whitening of incomplete
//! quotes, and TOPSIS ranking composed into explained recommendations.

pub mod domain;
pub mod error;
pub mod grey;
pub mod intake;
pub mod neutrosophic;
pub mod recommendation;
pub mod repository;
pub mod router;
pub mod service;
pub mod topsis;

#[cfg(test)]
mod tests;

pub use domain::{
    Alternative, CriterionObservation, CriterionSpec, Direction, Prior, RankingResult, Rule,
    UncertainObservation, WhitenedValue, WhiteningMethod,
};
pub use error::{DecisionError, DecisionWarning};
pub use grey::{grey_relation, GreyParameters, GreyWhitener};
pub use intake::{AlternativeCsv, IntakeError};
pub use neutrosophic::{AdmissionThresholds, RuleAdmission};
pub use recommendation::{EngineConfig, Recommendation, RecommendationEngine, ResolvedObservation};
pub use repository::{RepositoryError, RuleRepository};
pub use router::decision_router;
pub use service::{RecommendationService, RecommendationServiceError};
pub use topsis::RankingTable;
