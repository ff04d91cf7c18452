use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    Alternative, CriterionObservation, CriterionSpec, Rule, UncertainObservation, WhiteningMethod,
};
use super::neutrosophic::{AdmissionThresholds, RuleAdmission};
use super::repository::{RepositoryError, RuleRepository};
use super::service::{RecommendationService, RecommendationServiceError};
use super::topsis;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RankRequest {
    pub(crate) alternatives: Vec<Alternative>,
    pub(crate) criteria: Vec<CriterionSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecommendRequest {
    pub(crate) alternatives: Vec<Alternative>,
    #[serde(default)]
    pub(crate) observations: Vec<CriterionObservation>,
    pub(crate) criteria: Vec<CriterionSpec>,
    /// Overrides the stored rule set for this call only.
    #[serde(default)]
    pub(crate) rules: Option<Vec<Rule>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WhitenRequest {
    pub(crate) observations: Vec<UncertainObservation>,
    #[serde(default)]
    pub(crate) method: Option<WhiteningMethod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdmitRequest {
    pub(crate) rules: Vec<Rule>,
    #[serde(default)]
    pub(crate) thresholds: Option<AdmissionThresholds>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WeightUpdate {
    pub(crate) weight: f64,
}

/// Router builder exposing the decision engine over HTTP.
pub fn decision_router<R>(service: Arc<RecommendationService<R>>) -> Router
where
    R: RuleRepository + 'static,
{
    Router::new()
        .route("/api/v1/decision/rank", post(rank_handler::<R>))
        .route("/api/v1/decision/recommend", post(recommend_handler::<R>))
        .route("/api/v1/decision/whiten", post(whiten_handler::<R>))
        .route("/api/v1/decision/rules/admit", post(admit_handler::<R>))
        .route(
            "/api/v1/decision/rules",
            axum::routing::get(list_rules_handler::<R>).put(replace_rules_handler::<R>),
        )
        .route(
            "/api/v1/decision/rules/:rule_id/weight",
            patch(update_weight_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn rank_handler<R>(
    State(_service): State<Arc<RecommendationService<R>>>,
    axum::Json(request): axum::Json<RankRequest>,
) -> Response
where
    R: RuleRepository + 'static,
{
    match topsis::rank(&request.alternatives, &request.criteria) {
        Ok(ranked) => (StatusCode::OK, axum::Json(json!({ "ranked": ranked }))).into_response(),
        Err(error) => error_response(RecommendationServiceError::Decision(error)),
    }
}

pub(crate) async fn recommend_handler<R>(
    State(service): State<Arc<RecommendationService<R>>>,
    axum::Json(request): axum::Json<RecommendRequest>,
) -> Response
where
    R: RuleRepository + 'static,
{
    let RecommendRequest {
        alternatives,
        observations,
        criteria,
        rules,
    } = request;

    let result = match rules {
        Some(rules) => service
            .engine()
            .recommend(&alternatives, &observations, &rules, &criteria)
            .map_err(RecommendationServiceError::from),
        None => service.recommend(&alternatives, &observations, &criteria),
    };

    match result {
        Ok(recommendation) => (StatusCode::OK, axum::Json(recommendation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn whiten_handler<R>(
    State(service): State<Arc<RecommendationService<R>>>,
    axum::Json(request): axum::Json<WhitenRequest>,
) -> Response
where
    R: RuleRepository + 'static,
{
    let whitener = service.engine().whitener();
    let whitened: Vec<_> = request
        .observations
        .iter()
        .map(|observation| whitener.whiten(observation, request.method))
        .collect();
    (StatusCode::OK, axum::Json(json!({ "whitened": whitened }))).into_response()
}

pub(crate) async fn admit_handler<R>(
    State(service): State<Arc<RecommendationService<R>>>,
    axum::Json(request): axum::Json<AdmitRequest>,
) -> Response
where
    R: RuleRepository + 'static,
{
    let thresholds = request
        .thresholds
        .unwrap_or_else(|| service.engine().config().thresholds());
    if let Err(error) = thresholds
        .validate()
        .and_then(|_| request.rules.iter().try_for_each(Rule::validate))
    {
        return error_response(error.into());
    }

    let admission = RuleAdmission::evaluate(&request.rules, &thresholds);
    (StatusCode::OK, axum::Json(admission)).into_response()
}

pub(crate) async fn list_rules_handler<R>(
    State(service): State<Arc<RecommendationService<R>>>,
) -> Response
where
    R: RuleRepository + 'static,
{
    match service.rules() {
        Ok(rules) => (StatusCode::OK, axum::Json(json!({ "rules": rules }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn replace_rules_handler<R>(
    State(service): State<Arc<RecommendationService<R>>>,
    axum::Json(rules): axum::Json<Vec<Rule>>,
) -> Response
where
    R: RuleRepository + 'static,
{
    match service.replace_rules(rules) {
        Ok(count) => (StatusCode::OK, axum::Json(json!({ "stored": count }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_weight_handler<R>(
    State(service): State<Arc<RecommendationService<R>>>,
    Path(rule_id): Path<String>,
    axum::Json(update): axum::Json<WeightUpdate>,
) -> Response
where
    R: RuleRepository + 'static,
{
    match service.adjust_weight(&rule_id, update.weight) {
        Ok(rule) => (StatusCode::OK, axum::Json(rule)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: RecommendationServiceError) -> Response {
    let status = match &error {
        RecommendationServiceError::Decision(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RecommendationServiceError::Repository(RepositoryError::NotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        RecommendationServiceError::Repository(RepositoryError::InvalidWeight(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RecommendationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
