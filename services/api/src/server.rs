use crate::cli::ServeArgs;
use crate::infra::{build_advisory_service, AppState, LogCommentNotifier};
use crate::routes::with_case_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use risk_advisor::config::AppConfig;
use risk_advisor::error::AppError;
use risk_advisor::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = build_advisory_service(&config.advisor, Arc::new(LogCommentNotifier))?;
    info!(
        case_store = ?config.advisor.case_store,
        access_file = ?config.advisor.access_file,
        "advisory service configured"
    );

    let app = with_case_routes(Arc::new(service))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "risk advisor api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
