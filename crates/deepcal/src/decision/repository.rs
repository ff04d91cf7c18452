use super::domain::Rule;

/// Storage abstraction for the live rule set an external learning process may adapt.
pub trait RuleRepository: Send + Sync {
    /// Consistent copy of every stored rule.
    fn snapshot(&self) -> Result<Vec<Rule>, RepositoryError>;
    fn replace(&self, rules: Vec<Rule>) -> Result<(), RepositoryError>;
    fn update_weight(&self, rule_id: &str, weight: f64) -> Result<Rule, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("rule not found: {0}")]
    NotFound(String),
    #[error("rule weight must lie in [0, 1], found {0}")]
    InvalidWeight(f64),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
