//! HTTP/JSON binding for the invoice aggregator.
//!
//! Endpoints:
//! - `GET /invoice?obu=<id>` - current invoice for a vehicle
//! - `POST /aggregate` - accumulate a JSON distance delta
//! - `GET /metrics` - Prometheus exposition, when a recorder is installed
//! - `GET /health` - liveness
//!
//! Errors use the same kind-to-status table as the gRPC binding, with a
//! `{"error": "<message>"}` body.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::services::Aggregator;
use toll_client::{BillingError, DistanceDelta, InvoiceSnapshot};

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct RestState {
    aggregator: Arc<dyn Aggregator>,
    metrics: Option<PrometheusHandle>,
}

/// [`BillingError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub BillingError);

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.0.to_string() }));
        (self.0.http_status(), body).into_response()
    }
}

/// Build the axum router (separated for testing).
pub fn router(aggregator: Arc<dyn Aggregator>, metrics: Option<PrometheusHandle>) -> Router {
    Router::new()
        .route("/invoice", get(get_invoice).fallback(wrong_method))
        .route("/aggregate", post(aggregate).fallback(wrong_method))
        .route("/metrics", get(render_metrics))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(RestState {
            aggregator,
            metrics,
        })
}

/// Router exposing only `/metrics` and `/health`, for processes without
/// an aggregator.
pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route(
            "/metrics",
            get(move || {
                let handle = handle.clone();
                async move { handle.render() }
            }),
        )
        .route("/health", get(health))
}

/// Serve `app` on an already bound listener until `signal` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, signal: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(address = %addr, "HTTP server listening");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_invoice(
    State(state): State<RestState>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Json<InvoiceSnapshot>, ApiError> {
    let Query(params) = query.map_err(|e| BillingError::validation(e.body_text()))?;
    let raw = params
        .get("obu")
        .ok_or_else(|| BillingError::validation("missing obu query parameter"))?;
    let vehicle_id: i64 = raw
        .trim()
        .parse()
        .map_err(|_| BillingError::validation(format!("obu must be an integer, got {raw:?}")))?;

    let invoice = state.aggregator.calculate_invoice(vehicle_id).await?;
    Ok(Json(invoice))
}

async fn aggregate(
    State(state): State<RestState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let delta: DistanceDelta = serde_json::from_slice(&body)
        .map_err(|e| BillingError::validation(format!("malformed distance: {e}")))?;
    debug!(obu_id = delta.vehicle_id, "HTTP aggregate");

    state.aggregator.aggregate_distance(delta).await?;
    Ok(Json(json!({})))
}

async fn wrong_method(method: Method) -> ApiError {
    ApiError(BillingError::validation(format!(
        "method {method} not allowed"
    )))
}

async fn render_metrics(State(state): State<RestState>) -> Response {
    match state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn health() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests;
