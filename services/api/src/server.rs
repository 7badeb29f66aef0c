use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryApplicationRepository, TracingReviewNotifier};
use crate::routes::with_application_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use grantflow::config::AppConfig;
use grantflow::error::AppError;
use grantflow::telemetry;
use grantflow::workflows::grants::applications::GrantApplicationService;
use grantflow::workflows::grants::GrantCatalog;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(path) = args.grants.take() {
        config.catalog.grants_path = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let catalog = match &config.catalog.grants_path {
        Some(path) => {
            let catalog = GrantCatalog::from_path(path)?;
            info!(grants = catalog.len(), path = %path.display(), "grant catalog loaded");
            catalog
        }
        None => {
            warn!("APP_GRANTS_PATH not set; serving an empty grant catalog");
            GrantCatalog::default()
        }
    };

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let application_service = Arc::new(GrantApplicationService::new(
        Arc::new(catalog),
        Arc::new(InMemoryApplicationRepository::default()),
        Arc::new(TracingReviewNotifier),
        config.fees,
    ));

    let app = with_application_routes(application_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        fee_rate = config.fees.rate,
        fee_minimum = config.fees.minimum,
        fee_maximum = config.fees.maximum,
        "grant application service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
