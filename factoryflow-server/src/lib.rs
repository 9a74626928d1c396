//! HTTP front end for factoryflow.
//!
//! Routes:
//!
//! | method | path | answer |
//! |---|---|---|
//! | GET | `/version` | app version |
//! | GET | `/time` | UTC time, `%Y/%m/%d-%H:%M:%S` |
//! | POST | `/pipeline` | create a pipeline |
//! | GET | `/pipeline/:pipeline_name` | rebuild a pipeline request |
//! | POST | `/pipeline/:pipeline_name/run` | start a run |
//! | GET | `/pipeline/:pipeline_name/run/:run_id` | run status |
//!
//! Every answer is `200` with a structured body whose `error.code` tells
//! success from failure, except a missing pipeline, which is `404`.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc
)]

pub mod logging;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use factoryflow::client::FactoryClient;
use factoryflow::config::FactoryConfig;
use factoryflow::core::{ApiError, PipelineRequest, PipelineResponse, RunResponse};
use factoryflow::errors::{ErrorCode, FactoryError};
use factoryflow::orchestrator::{PipelineOrchestrator, RunOrchestrator};
use factoryflow::utils::clock_time;

/// Shared state of the HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Arc<FactoryConfig>,
    /// Pipeline orchestrator.
    pub pipelines: PipelineOrchestrator,
    /// Run orchestrator.
    pub runs: RunOrchestrator,
}

impl AppState {
    /// Wires both orchestrators over one client.
    #[must_use]
    pub fn new(client: Arc<dyn FactoryClient>, config: Arc<FactoryConfig>) -> Self {
        Self {
            pipelines: PipelineOrchestrator::new(client.clone(), config.clone()),
            runs: RunOrchestrator::new(client),
            config,
        }
    }
}

/// A failure answered with an [`ApiError`] body.
#[derive(Debug)]
pub struct ApiFailure(FactoryError);

impl From<FactoryError> for ApiFailure {
    fn from(err: FactoryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            FactoryError::NotFound { message, .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new(ErrorCode::PipelineGetException, message),
            ),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new(ErrorCode::DataFactoryError, other.to_string()),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/version", get(version))
        .route("/time", get(time))
        .route("/pipeline", post(create_pipeline))
        .route("/pipeline/:pipeline_name", get(get_pipeline))
        .route("/pipeline/:pipeline_name/run", post(run_pipeline))
        .route("/pipeline/:pipeline_name/run/:run_id", get(get_run))
        .with_state(state)
}

/// Serves until Ctrl+C or SIGTERM.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    serve_with_shutdown(listener, state, shutdown_signal()).await
}

/// Serves until `shutdown` completes.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "serve: listening");
    }
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

async fn version(State(state): State<Arc<AppState>>) -> Json<String> {
    Json(state.config.app_version.clone())
}

async fn time() -> Json<String> {
    Json(clock_time())
}

async fn create_pipeline(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PipelineRequest>,
) -> Json<PipelineResponse> {
    info!(columns = ?request.columns, "POST /pipeline");
    let response = state.pipelines.create_or_get(&request).await;
    info!(pipeline = %response.pipeline_name, code = %response.error.code, "POST /pipeline: done");
    Json(response)
}

async fn get_pipeline(
    State(state): State<Arc<AppState>>,
    Path(pipeline_name): Path<String>,
) -> Result<Json<PipelineResponse>, ApiFailure> {
    info!(pipeline = %pipeline_name, "GET /pipeline");
    match state.pipelines.fetch(&pipeline_name).await {
        Ok(response) => {
            info!(pipeline = %pipeline_name, code = %response.error.code, "GET /pipeline: done");
            Ok(Json(response))
        }
        Err(err) => {
            warn!(pipeline = %pipeline_name, error = %err, "GET /pipeline: failed");
            Err(err.into())
        }
    }
}

async fn run_pipeline(
    State(state): State<Arc<AppState>>,
    Path(pipeline_name): Path<String>,
) -> Json<RunResponse> {
    info!(pipeline = %pipeline_name, "POST /pipeline/run");
    let response = state.runs.trigger(&pipeline_name).await;
    info!(
        pipeline = %pipeline_name,
        run_id = %response.run_id,
        code = %response.error.code,
        "POST /pipeline/run: done"
    );
    Json(response)
}

async fn get_run(
    State(state): State<Arc<AppState>>,
    Path((pipeline_name, run_id)): Path<(String, String)>,
) -> Json<RunResponse> {
    info!(pipeline = %pipeline_name, %run_id, "GET /pipeline/run");
    let response = state.runs.poll(&pipeline_name, &run_id).await;
    info!(
        pipeline = %pipeline_name,
        %run_id,
        status = %response.run_status(),
        code = %response.error.code,
        "GET /pipeline/run: done"
    );
    Json(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let response =
            ApiFailure::from(FactoryError::not_found("Pipelinex", "Pipeline not found"))
                .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_other_failures_map_to_500() {
        let response =
            ApiFailure::from(FactoryError::Internal("boom".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
