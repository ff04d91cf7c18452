use std::sync::Arc;

use super::domain::{Alternative, CriterionObservation, CriterionSpec, Rule};
use super::error::DecisionError;
use super::recommendation::{Recommendation, RecommendationEngine};
use super::repository::{RepositoryError, RuleRepository};

/// Service pairing the stateless engine with the shared rule store.
pub struct RecommendationService<R> {
    repository: Arc<R>,
    engine: Arc<RecommendationEngine>,
}

impl<R> RecommendationService<R>
where
    R: RuleRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine: RecommendationEngine) -> Self {
        Self {
            repository,
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// Rank against a single snapshot of the stored rules taken at call entry.
    pub fn recommend(
        &self,
        alternatives: &[Alternative],
        observations: &[CriterionObservation],
        criteria: &[CriterionSpec],
    ) -> Result<Recommendation, RecommendationServiceError> {
        let rules = self.repository.snapshot()?;
        let recommendation = self
            .engine
            .recommend(alternatives, observations, &rules, criteria)?;
        Ok(recommendation)
    }

    pub fn rules(&self) -> Result<Vec<Rule>, RecommendationServiceError> {
        Ok(self.repository.snapshot()?)
    }

    pub fn replace_rules(&self, rules: Vec<Rule>) -> Result<usize, RecommendationServiceError> {
        rules.iter().try_for_each(Rule::validate)?;
        let count = rules.len();
        self.repository.replace(rules)?;
        Ok(count)
    }

    pub fn adjust_weight(
        &self,
        rule_id: &str,
        weight: f64,
    ) -> Result<Rule, RecommendationServiceError> {
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(RepositoryError::InvalidWeight(weight).into());
        }
        Ok(self.repository.update_weight(rule_id, weight)?)
    }
}

/// Error raised by the recommendation service.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationServiceError {
    #[error(transparent)]
    Decision(#[from] DecisionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
