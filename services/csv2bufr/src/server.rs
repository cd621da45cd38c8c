//! HTTP server for the csv2bufr service.
//!
//! Provides endpoints for:
//! - `POST /transform` - Convert a CSV file on the shared volume to BUFR
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus metrics

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bufr_conversion::ConversionEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::error::TransformError;
use crate::metrics::{self, RequestOutcome};
use crate::transform::{run_transform, TransformRequest};

/// Shared state for the HTTP server.
pub struct ServerState {
    /// Engine performing the CSV-to-BUFR conversion
    pub engine: Arc<dyn ConversionEngine>,
    /// Renders the Prometheus exposition
    pub metrics: PrometheusHandle,
}

impl ServerState {
    pub fn new(engine: Arc<dyn ConversionEngine>, metrics: PrometheusHandle) -> Self {
        Self { engine, metrics }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// POST /transform - Convert a CSV file to BUFR
async fn transform_handler(
    Extension(state): Extension<Arc<ServerState>>,
    body: Bytes,
) -> Response {
    let started = Instant::now();

    let request = match TransformRequest::from_json(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Rejected transform request");
            metrics::record_request(RequestOutcome::Rejected, started.elapsed());
            return e.into_response();
        }
    };

    info!(
        input_file = %request.input_file,
        output_dir = %request.output_dir,
        engine = state.engine.name(),
        "Received transform request"
    );

    match run_transform(state.engine.as_ref(), &request).await {
        Ok(response) => {
            let (status, outcome) = if response.success {
                (StatusCode::OK, RequestOutcome::Success)
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, RequestOutcome::Failed)
            };
            if !response.errors.is_empty() {
                warn!(errors = ?response.errors, "Transform completed with errors");
            }
            metrics::record_request(outcome, started.elapsed());
            (status, Json(response)).into_response()
        }
        Err(e) if e.is_client_error() => {
            warn!(error = %e, "Rejected transform request");
            metrics::record_request(RequestOutcome::Rejected, started.elapsed());
            e.into_response()
        }
        Err(e) => {
            error!(error = ?e, "Unexpected error during transform");
            metrics::record_request(RequestOutcome::Failed, started.elapsed());
            e.into_response()
        }
    }
}

/// GET /health - Health check
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// GET /metrics - Prometheus metrics
async fn metrics_handler(Extension(state): Extension<Arc<ServerState>>) -> impl IntoResponse {
    state.metrics.render()
}

/// Turn a handler panic into the usual error envelope.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    error!(panic = %detail, "Handler panicked");
    metrics::record_request(RequestOutcome::Failed, std::time::Duration::ZERO);
    TransformError::Internal(detail).into_response()
}

/// Build the HTTP router.
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/transform", post(transform_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
}

/// Start the HTTP server and run until a shutdown signal arrives.
pub async fn start_server(state: Arc<ServerState>, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port = port, "Starting csv2bufr HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("csv2bufr HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Could not install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
