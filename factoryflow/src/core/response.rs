//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};

use super::dataset::Dataset;
use super::status::RunStatus;
use crate::errors::ErrorCode;
use crate::utils::{now_utc, Timestamp};

/// Value reported in [`ApiError::source`].
pub const ERROR_SOURCE: &str = "factory_rest_api";

/// A logical pipeline: source joined with join on `columns[0]`, projected
/// onto `columns`, written to sink.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineRequest {
    /// Dataset read in full.
    pub source: Dataset,
    /// Dataset providing the join keys.
    pub join: Dataset,
    /// Selected columns; the first one is the join key.
    pub columns: Vec<String>,
    /// Output location.
    pub sink: Dataset,
}

/// The unit over which pipeline identity is computed.
pub type PipelineSpec = PipelineRequest;

impl PipelineRequest {
    /// Creates a new request.
    #[must_use]
    pub fn new(source: Dataset, join: Dataset, sink: Dataset, columns: Vec<String>) -> Self {
        Self {
            source,
            join,
            columns,
            sink,
        }
    }

    /// The join key, if any column is selected.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.columns.first().map(String::as_str)
    }
}

/// Structured error carried by every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Numeric error code; `0` on success.
    pub code: ErrorCode,
    /// Human readable message; empty on success.
    pub message: String,
    /// Component reporting the error.
    pub source: String,
    /// When the response was produced.
    pub date: Timestamp,
}

impl ApiError {
    /// Creates an error stamped with the current time.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: ERROR_SOURCE.to_string(),
            date: now_utc(),
        }
    }

    /// A success marker.
    #[must_use]
    pub fn none() -> Self {
        Self::new(ErrorCode::NoError, "")
    }

    /// Returns true if the code is [`ErrorCode::NoError`].
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code.is_ok()
    }
}

/// Pipeline configuration as seen by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResponse {
    /// Source dataset.
    pub source: Dataset,
    /// Join dataset.
    pub join: Dataset,
    /// Selected columns.
    pub columns: Vec<String>,
    /// Sink dataset.
    pub sink: Dataset,
    /// Remote pipeline name, `Pipeline<identity>`.
    pub pipeline_name: String,
    /// Outcome.
    pub error: ApiError,
}

impl PipelineResponse {
    /// Echoes a request back with the given outcome.
    #[must_use]
    pub fn from_request(
        request: &PipelineRequest,
        pipeline_name: impl Into<String>,
        error: ApiError,
    ) -> Self {
        Self {
            source: request.source.clone(),
            join: request.join.clone(),
            columns: request.columns.clone(),
            sink: request.sink.clone(),
            pipeline_name: pipeline_name.into(),
            error,
        }
    }

    /// A response with empty datasets, used when nothing could be recovered.
    #[must_use]
    pub fn empty(
        resource_group_name: &str,
        pipeline_name: impl Into<String>,
        error: ApiError,
    ) -> Self {
        let dataset = Dataset::empty(resource_group_name);
        Self {
            source: dataset.clone(),
            join: dataset.clone(),
            columns: Vec::new(),
            sink: dataset,
            pipeline_name: pipeline_name.into(),
            error,
        }
    }
}

/// Status and timing of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDetails {
    /// Current status.
    pub status: RunStatus,
    /// Run start.
    pub start: Timestamp,
    /// Run end, or the query time while running.
    pub end: Timestamp,
    /// Duration in milliseconds.
    pub duration: i64,
}

/// A pipeline run as seen by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResponse {
    /// Remote run id; empty if submission failed.
    pub run_id: String,
    /// Pipeline the run belongs to.
    pub pipeline_name: String,
    /// Status details.
    pub status: StatusDetails,
    /// Outcome.
    pub error: ApiError,
}

impl RunResponse {
    /// Creates a run response.
    #[must_use]
    pub fn new(
        run_id: impl Into<String>,
        pipeline_name: impl Into<String>,
        status: StatusDetails,
        error: ApiError,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            pipeline_name: pipeline_name.into(),
            status,
            error,
        }
    }

    /// A failed run stamped with the current time and zero duration.
    #[must_use]
    pub fn failed(
        run_id: impl Into<String>,
        pipeline_name: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Self {
        let now = now_utc();
        Self::new(
            run_id,
            pipeline_name,
            StatusDetails {
                status: RunStatus::Failed,
                start: now,
                end: now,
                duration: 0,
            },
            ApiError::new(code, message),
        )
    }

    /// Current status.
    #[must_use]
    pub fn run_status(&self) -> RunStatus {
        self.status.status
    }
}
