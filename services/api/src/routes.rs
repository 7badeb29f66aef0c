use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use grantflow::workflows::grants::applications::{
    application_router, ApplicationRepository, GrantApplicationService, ReviewNotifier,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_application_routes<R, N>(
    service: Arc<GrantApplicationService<R, N>>,
) -> axum::Router
where
    R: ApplicationRepository + 'static,
    N: ReviewNotifier + 'static,
{
    application_router(service)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryApplicationRepository, TracingReviewNotifier};
    use axum::body::Body;
    use axum::http::Request;
    use grantflow::workflows::grants::{FeeSchedule, GrantCatalog};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn router(ready: bool) -> axum::Router {
        let service = Arc::new(GrantApplicationService::new(
            Arc::new(GrantCatalog::default()),
            Arc::new(InMemoryApplicationRepository::default()),
            Arc::new(TracingReviewNotifier),
            FeeSchedule::STANDARD,
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_application_routes(service).layer(Extension(state))
    }

    async fn status_of(router: axum::Router, uri: &str) -> StatusCode {
        router
            .oneshot(Request::get(uri).body(Body::empty()).expect("request builds"))
            .await
            .expect("route executes")
            .status()
    }

    #[tokio::test]
    async fn health_and_readiness_reflect_state() {
        assert_eq!(status_of(router(false), "/health").await, StatusCode::OK);
        assert_eq!(
            status_of(router(false), "/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_of(router(true), "/ready").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn application_routes_are_mounted_alongside_probes() {
        assert_eq!(
            status_of(router(true), "/api/v1/grants").await,
            StatusCode::OK
        );
        assert_eq!(status_of(router(true), "/metrics").await, StatusCode::OK);
    }
}
