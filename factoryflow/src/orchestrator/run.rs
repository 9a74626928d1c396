//! Pipeline run submission and status polling.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::client::{CreateRunResponse, FactoryClient, PipelineRun};
use crate::core::{ApiError, RunResponse, RunStatus, StatusDetails};
use crate::errors::ErrorCode;
use crate::identity::{identity_from_annotations, PipelineIdentity, IDENTITY_PARAMETER};
use crate::utils::now_utc;

/// Submits runs and reports their status.
///
/// Neither operation returns an error: failures are reported through the
/// response's error code.
#[derive(Clone)]
pub struct RunOrchestrator {
    client: Arc<dyn FactoryClient>,
}

impl std::fmt::Debug for RunOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunOrchestrator").finish_non_exhaustive()
    }
}

impl RunOrchestrator {
    /// Creates an orchestrator over a control-plane client.
    #[must_use]
    pub fn new(client: Arc<dyn FactoryClient>) -> Self {
        Self { client }
    }

    /// Starts a run of the named pipeline.
    ///
    /// The pipeline identity is passed as the `Pipeline_id` run parameter.
    pub async fn trigger(&self, pipeline_name: &str) -> RunResponse {
        let identity = PipelineIdentity::from_pipeline_name(pipeline_name);
        info!(pipeline = %pipeline_name, "trigger: called");

        let parameters = HashMap::from([(IDENTITY_PARAMETER.to_string(), identity.to_string())]);
        match self.client.create_run(pipeline_name, &parameters).await {
            Ok(CreateRunResponse {
                run_id: Some(run_id),
            }) => {
                info!(pipeline = %pipeline_name, %run_id, "trigger: run started");
                let now = now_utc();
                RunResponse::new(
                    run_id,
                    pipeline_name,
                    StatusDetails {
                        status: RunStatus::InProgress,
                        start: now,
                        end: now,
                        duration: 0,
                    },
                    ApiError::none(),
                )
            }
            Ok(_) => {
                warn!(pipeline = %pipeline_name, "trigger: no run id returned");
                RunResponse::failed(
                    "",
                    pipeline_name,
                    ErrorCode::RunPipelineError,
                    "Run pipeline error: no run id returned",
                )
            }
            Err(err) => {
                error!(pipeline = %pipeline_name, error = %err, "trigger: failed");
                RunResponse::failed(
                    "",
                    pipeline_name,
                    ErrorCode::RunPipelineException,
                    format!("Run pipeline exception: {err}"),
                )
            }
        }
    }

    /// Reports the status of a run of the named pipeline.
    ///
    /// A run whose identity annotation does not match the pipeline name is
    /// reported as failed with [`ErrorCode::PipelineIdNotFound`].
    pub async fn poll(&self, pipeline_name: &str, run_id: &str) -> RunResponse {
        let expected = PipelineIdentity::from_pipeline_name(pipeline_name);
        info!(pipeline = %pipeline_name, %run_id, "poll: called");

        let run = match self.client.get_pipeline_run(run_id).await {
            Ok(run) => run,
            Err(err) => {
                error!(pipeline = %pipeline_name, %run_id, error = %err, "poll: failed");
                return RunResponse::failed(
                    run_id,
                    pipeline_name,
                    ErrorCode::RunPipelineException,
                    format!("Run pipeline exception: {err}"),
                );
            }
        };

        let actual = run
            .annotations
            .as_deref()
            .and_then(identity_from_annotations);
        if actual.as_ref() != Some(&expected) {
            warn!(
                pipeline = %pipeline_name,
                %run_id,
                found = ?actual.as_ref().map(PipelineIdentity::as_str),
                "poll: identity mismatch"
            );
            return RunResponse::failed(
                run_id,
                pipeline_name,
                ErrorCode::PipelineIdNotFound,
                format!("Pipeline id '{expected}' not found"),
            );
        }

        let response = run_response(pipeline_name, run_id, run);
        info!(pipeline = %pipeline_name, %run_id, status = %response.run_status(), "poll: status");
        response
    }
}

fn run_response(pipeline_name: &str, run_id: &str, run: PipelineRun) -> RunResponse {
    let now = now_utc();
    RunResponse::new(
        run_id,
        pipeline_name,
        StatusDetails {
            status: RunStatus::from_remote(&run.status),
            start: run.run_start.unwrap_or(now),
            end: run.run_end.unwrap_or(now),
            duration: run.duration_in_ms.unwrap_or(0),
        },
        ApiError::new(ErrorCode::NoError, run.message.unwrap_or_default()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_run_response_copies_remote_fields() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 10, 5, 0).unwrap();
        let run = PipelineRun {
            run_id: "r1".to_string(),
            status: "Succeeded".to_string(),
            run_start: Some(start),
            run_end: Some(end),
            duration_in_ms: Some(300_000),
            message: Some("done".to_string()),
            ..PipelineRun::default()
        };
        let response = run_response("Pipelineabc", "r1", run);

        assert_eq!(response.run_status(), RunStatus::Succeeded);
        assert_eq!(response.status.start, start);
        assert_eq!(response.status.end, end);
        assert_eq!(response.status.duration, 300_000);
        assert_eq!(response.error.code, ErrorCode::NoError);
        assert_eq!(response.error.message, "done");
    }

    #[test]
    fn test_run_response_defaults_for_absent_fields() {
        let before = now_utc();
        let run = PipelineRun {
            status: "Queued".to_string(),
            ..PipelineRun::default()
        };
        let response = run_response("Pipelineabc", "r1", run);

        assert_eq!(response.run_status(), RunStatus::Queued);
        assert!(response.status.start >= before);
        assert_eq!(response.status.duration, 0);
        assert_eq!(response.error.message, "");
    }
}
