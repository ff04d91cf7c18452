use crate::cli::ServeArgs;
use crate::infra::{default_rules, load_rules, AppState, InMemoryRuleRepository};
use crate::routes::with_decision_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use deepcal::config::AppConfig;
use deepcal::decision::{RecommendationEngine, RecommendationService};
use deepcal::error::AppError;
use deepcal::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let rules = match &config.rules_path {
        Some(path) => load_rules(path)?,
        None => default_rules(),
    };
    info!(rules = rules.len(), "rule store seeded");

    let repository = Arc::new(InMemoryRuleRepository::seeded(rules));
    let engine = RecommendationEngine::new(config.engine.clone());
    let service = Arc::new(RecommendationService::new(repository, engine));

    let app = with_decision_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "decision service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
