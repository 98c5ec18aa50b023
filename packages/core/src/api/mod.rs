//! Health and metrics HTTP endpoint.
//!
//! Served only when a metrics port is configured. It reads Prometheus
//! counters and never touches the check cycle.

pub mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::Response,
    routing::get,
    Router,
};

use crate::error::AppError;
use crate::metrics::AppMetrics;

/// Build the `/health` + `/metrics` router.
pub fn create_router(metrics: Arc<AppMetrics>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(render_metrics))
        .with_state(metrics)
}

async fn render_metrics(State(metrics): State<Arc<AppMetrics>>) -> Response {
    match metrics.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/plain; version=0.0.4")
            .body(Body::from(body))
            .expect("metrics response should be valid"),
        Err(err) => {
            tracing::error!("Failed to render metrics: {}", err);
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::from("metrics error"))
                .expect("metrics error response should be valid")
        }
    }
}

/// Bind the endpoint and serve it on a background task.
pub async fn spawn_server(port: u16, metrics: Arc<AppMetrics>) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::startup(format!("Cannot bind metrics port {}: {}", port, err)))?;

    tracing::info!("Metrics endpoint listening on http://{}/metrics", addr);

    let app = create_router(metrics);
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!("Metrics server error: {}", err);
        }
    });

    Ok(())
}
