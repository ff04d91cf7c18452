use deepcal::decision::{RepositoryError, Rule, RuleRepository};
use deepcal::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local rule store. Readers copy the whole set under the read lock.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRuleRepository {
    rules: Arc<RwLock<Vec<Rule>>>,
}

impl InMemoryRuleRepository {
    pub(crate) fn seeded(rules: Vec<Rule>) -> Self {
        Self {
            rules: Arc::new(RwLock::new(rules)),
        }
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("rule store lock poisoned".to_string())
}

impl RuleRepository for InMemoryRuleRepository {
    fn snapshot(&self) -> Result<Vec<Rule>, RepositoryError> {
        let guard = self.rules.read().map_err(|_| poisoned())?;
        Ok(guard.clone())
    }

    fn replace(&self, rules: Vec<Rule>) -> Result<(), RepositoryError> {
        let mut guard = self.rules.write().map_err(|_| poisoned())?;
        *guard = rules;
        Ok(())
    }

    fn update_weight(&self, rule_id: &str, weight: f64) -> Result<Rule, RepositoryError> {
        let mut guard = self.rules.write().map_err(|_| poisoned())?;
        let rule = guard
            .iter_mut()
            .find(|rule| rule.id == rule_id)
            .ok_or_else(|| RepositoryError::NotFound(rule_id.to_string()))?;
        rule.weight = weight;
        Ok(rule.clone())
    }
}

/// Corridor-wide rules the service starts with when no rule file is configured.
pub(crate) fn default_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            "customs-single-window",
            "Customs single window clears documents within 48 hours",
            0.86,
            0.07,
            0.04,
        )
        .with_category("risk"),
        Rule::new(
            "port-dwell",
            "Port dwell time at Mombasa stays under four days",
            0.82,
            0.09,
            0.05,
        )
        .with_category("time"),
        Rule::new(
            "rainy-season-roads",
            "Rainy season keeps northern corridor roads passable",
            0.64,
            0.22,
            0.12,
        )
        .with_category("risk"),
    ]
}

pub(crate) fn load_rules(path: &Path) -> Result<Vec<Rule>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let rules: Vec<Rule> = serde_json::from_str(&raw)?;
    rules.iter().try_for_each(Rule::validate)?;
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepcal::decision::{DecisionError, RecommendationServiceError};

    #[test]
    fn update_weight_changes_only_the_target_rule() {
        let repository = InMemoryRuleRepository::seeded(default_rules());
        let updated = repository
            .update_weight("port-dwell", 0.25)
            .expect("rule exists");
        assert_eq!(updated.weight, 0.25);

        let snapshot = repository.snapshot().expect("snapshot");
        let weights: Vec<f64> = snapshot.iter().map(|rule| rule.weight).collect();
        assert_eq!(weights, vec![1.0, 0.25, 1.0]);
    }

    #[test]
    fn snapshot_is_detached_from_later_updates() {
        let repository = InMemoryRuleRepository::seeded(default_rules());
        let before = repository.snapshot().expect("snapshot");
        repository
            .update_weight("customs-single-window", 0.1)
            .expect("rule exists");
        assert_eq!(before[0].weight, 1.0);
    }

    #[test]
    fn unknown_rule_is_not_found() {
        let repository = InMemoryRuleRepository::default();
        assert!(matches!(
            repository.update_weight("missing", 0.5),
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[test]
    fn load_rules_reads_json_array() {
        let path = std::env::temp_dir().join(format!("deepcal-rules-{}.json", std::process::id()));
        let payload = serde_json::to_string(&default_rules()).expect("rules encode");
        std::fs::write(&path, payload).expect("rules written");

        let rules = load_rules(&path).expect("rules load");
        assert_eq!(rules, default_rules());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn load_rules_rejects_out_of_range_weights() {
        let path = std::env::temp_dir().join(format!(
            "deepcal-rules-heavy-{}.json",
            std::process::id()
        ));
        let heavy = vec![Rule::new("heavy", "Overweighted rule", 0.9, 0.05, 0.02).with_weight(7.0)];
        let payload = serde_json::to_string(&heavy).expect("rules encode");
        std::fs::write(&path, payload).expect("rules written");

        let result = load_rules(&path);
        std::fs::remove_file(&path).ok();
        match result {
            Err(AppError::Decision(RecommendationServiceError::Decision(
                DecisionError::InvalidRule { rule_id, .. },
            ))) => assert_eq!(rule_id, "heavy"),
            other => panic!("expected invalid rule, got {other:?}"),
        }
    }
}
