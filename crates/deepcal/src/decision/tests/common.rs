use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::decision::domain::{Alternative, CriterionSpec, Rule};
use crate::decision::recommendation::{EngineConfig, RecommendationEngine};
use crate::decision::repository::{RepositoryError, RuleRepository};
use crate::decision::service::RecommendationService;

pub(super) const EPS: f64 = 1e-9;

pub(super) fn approx(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}

/// Three forwarders quoted on cost, transit days, reliability and risk.
pub(super) fn forwarders() -> Vec<Alternative> {
    vec![
        Alternative::new("A", "Kuehne + Nagel", vec![3000.0, 5.0, 0.9, 0.1]),
        Alternative::new("B", "Bolloré", vec![1800.0, 14.0, 0.88, 0.12]),
        Alternative::new("C", "Siginon", vec![2400.0, 8.0, 0.78, 0.22]),
    ]
}

pub(super) fn freight_criteria() -> Vec<CriterionSpec> {
    vec![
        CriterionSpec::cost("cost", 0.35),
        CriterionSpec::cost("time", 0.35),
        CriterionSpec::benefit("reliability", 0.2),
        CriterionSpec::cost("risk", 0.1),
    ]
}

/// Four rules of which `on-time-a` and `customs-clear` clear the default thresholds.
pub(super) fn rule_set() -> Vec<Rule> {
    vec![
        Rule::new("on-time-a", "A delivers on time on the Mombasa corridor", 0.9, 0.05, 0.02)
            .with_category("reliability")
            .for_alternative("A"),
        Rule::new("customs-clear", "Customs clearance at Malaba is predictable", 0.85, 0.08, 0.04)
            .with_category("risk"),
        Rule::new("rainy-season", "Rainy season delays road freight", 0.7, 0.2, 0.1)
            .with_category("time"),
        Rule::new("fuel-surcharge", "Fuel surcharges stay flat", 0.95, 0.05, 0.1)
            .with_category("cost"),
    ]
}

pub(super) fn engine() -> RecommendationEngine {
    RecommendationEngine::new(EngineConfig::default())
}

#[derive(Default)]
pub(super) struct MemoryRuleRepository {
    rules: RwLock<BTreeMap<String, Rule>>,
    snapshots: AtomicUsize,
}

impl MemoryRuleRepository {
    pub(super) fn with_rules(rules: Vec<Rule>) -> Self {
        let repository = Self::default();
        repository.replace(rules).expect("seed rules");
        repository
    }

    pub(super) fn snapshot_count(&self) -> usize {
        self.snapshots.load(Ordering::SeqCst)
    }
}

impl RuleRepository for MemoryRuleRepository {
    fn snapshot(&self) -> Result<Vec<Rule>, RepositoryError> {
        self.snapshots.fetch_add(1, Ordering::SeqCst);
        let guard = self
            .rules
            .read()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".to_string()))?;
        Ok(guard.values().cloned().collect())
    }

    fn replace(&self, rules: Vec<Rule>) -> Result<(), RepositoryError> {
        let mut guard = self
            .rules
            .write()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".to_string()))?;
        *guard = rules.into_iter().map(|rule| (rule.id.clone(), rule)).collect();
        Ok(())
    }

    fn update_weight(&self, rule_id: &str, weight: f64) -> Result<Rule, RepositoryError> {
        let mut guard = self
            .rules
            .write()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".to_string()))?;
        let rule = guard
            .get_mut(rule_id)
            .ok_or_else(|| RepositoryError::NotFound(rule_id.to_string()))?;
        rule.weight = weight;
        Ok(rule.clone())
    }
}

pub(super) struct UnavailableRepository;

impl RuleRepository for UnavailableRepository {
    fn snapshot(&self) -> Result<Vec<Rule>, RepositoryError> {
        Err(RepositoryError::Unavailable("rule store offline".to_string()))
    }

    fn replace(&self, _rules: Vec<Rule>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("rule store offline".to_string()))
    }

    fn update_weight(&self, _rule_id: &str, _weight: f64) -> Result<Rule, RepositoryError> {
        Err(RepositoryError::Unavailable("rule store offline".to_string()))
    }
}

pub(super) fn memory_service() -> (
    Arc<MemoryRuleRepository>,
    Arc<RecommendationService<MemoryRuleRepository>>,
) {
    let repository = Arc::new(MemoryRuleRepository::with_rules(rule_set()));
    let service = Arc::new(RecommendationService::new(repository.clone(), engine()));
    (repository, service)
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    serde_json::from_slice(&bytes).expect("json body")
}

pub(super) async fn assert_error_status(response: Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    let body = json_body(response).await;
    assert!(body.get("error").is_some(), "missing error field: {body}");
    body
}
