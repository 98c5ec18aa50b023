use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::metrics::AppMetrics;

/// Liveness plus a short summary of the last cycle.
pub async fn health(State(metrics): State<Arc<AppMetrics>>) -> Response {
    let body = json!({
        "status": "ok",
        "cycles": metrics.cycles_total.get(),
        "targets_down": metrics.targets_down.get(),
    });

    let mut response = Json(body).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
