use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use deepcal::decision::{
    decision_router, AlternativeCsv, CriterionSpec, Recommendation, RecommendationService,
    RuleRepository,
};
use deepcal::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

/// Quote sheet submitted as CSV text, ranked against the stored rules.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuoteReportRequest {
    pub(crate) alternatives_csv: String,
    #[serde(default)]
    pub(crate) criteria: Option<Vec<CriterionSpec>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuoteReportResponse {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) criteria: Vec<CriterionSpec>,
    pub(crate) alternatives: usize,
    pub(crate) whitened_cells: usize,
    pub(crate) recommendation: Recommendation,
}

pub(crate) fn with_decision_routes<R>(service: Arc<RecommendationService<R>>) -> axum::Router
where
    R: RuleRepository + 'static,
{
    let reports = axum::Router::new()
        .route(
            "/api/v1/decision/report",
            axum::routing::post(quote_report_endpoint::<R>),
        )
        .with_state(service.clone());

    decision_router(service)
        .merge(reports)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn quote_report_endpoint<R>(
    State(service): State<Arc<RecommendationService<R>>>,
    Json(payload): Json<QuoteReportRequest>,
) -> Result<Json<QuoteReportResponse>, AppError>
where
    R: RuleRepository + 'static,
{
    let QuoteReportRequest {
        alternatives_csv,
        criteria,
    } = payload;

    let criteria = criteria.unwrap_or_else(CriterionSpec::logistics_defaults);
    let reader = Cursor::new(alternatives_csv.into_bytes());
    let intake = AlternativeCsv::from_reader(reader, &criteria)?;
    let recommendation = service.recommend(&intake.alternatives, &intake.observations, &criteria)?;

    Ok(Json(QuoteReportResponse {
        generated_at: Utc::now(),
        alternatives: intake.alternatives.len(),
        whitened_cells: intake.observations.len(),
        criteria,
        recommendation,
    }))
}
