//! Error types for the factoryflow service.
//!
//! Two layers of errors exist. [`FactoryError`] is the Rust error returned by
//! the control-plane client and configuration loading. [`ErrorCode`] is the
//! numeric code reported to HTTP clients inside a structured response body;
//! orchestrators convert the former into the latter at their boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The main error type for factoryflow operations.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// The remote resource does not exist.
    #[error("Resource not found: {resource} - {message}")]
    NotFound {
        /// Name of the missing resource.
        resource: String,
        /// Message returned by the control plane.
        message: String,
    },

    /// The control plane answered with a non-success status.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message returned by the control plane.
        message: String,
    },

    /// Transport-level failure.
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A bearer token could not be obtained.
    #[error("Credential error: {0}")]
    Credential(String),

    /// Configuration is missing or invalid.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FactoryError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised while loading [`crate::config::FactoryConfig`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is absent or empty.
    #[error("Missing configuration value: {0}")]
    Missing(String),

    /// A variable could not be parsed.
    #[error("Invalid configuration value for {key}: {value}")]
    Invalid {
        /// The variable name.
        key: String,
        /// The offending value.
        value: String,
    },
}

/// Numeric error codes reported in response bodies.
///
/// A `200 OK` response can still carry a non-zero code; clients must
/// inspect it to detect logical failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(into = "u16", try_from = "u16")]
pub enum ErrorCode {
    /// Success.
    #[default]
    NoError = 0,
    /// Dataset creation failed or the control plane raised during creation.
    DataFactoryError = 1,
    /// Pipeline create/update returned nothing.
    PipelineCreationError = 2,
    /// Dataflow create/update returned nothing.
    DataflowCreationError = 3,
    /// Run submission returned no run id.
    RunPipelineError = 4,
    /// Run submission or run lookup raised.
    RunPipelineException = 5,
    /// The run does not belong to the named pipeline.
    PipelineIdNotFound = 6,
    /// Unexpected failure while fetching a pipeline.
    PipelineGetException = 7,
}

impl ErrorCode {
    /// Returns the numeric value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns true for [`ErrorCode::NoError`].
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::NoError)
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.as_u16()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::NoError),
            1 => Ok(Self::DataFactoryError),
            2 => Ok(Self::PipelineCreationError),
            3 => Ok(Self::DataflowCreationError),
            4 => Ok(Self::RunPipelineError),
            5 => Ok(Self::RunPipelineException),
            6 => Ok(Self::PipelineIdNotFound),
            7 => Ok(Self::PipelineGetException),
            other => Err(format!("unknown error code {other}")),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoError => "no_error",
            Self::DataFactoryError => "data_factory_error",
            Self::PipelineCreationError => "pipeline_creation_error",
            Self::DataflowCreationError => "dataflow_creation_error",
            Self::RunPipelineError => "run_pipeline_error",
            Self::RunPipelineException => "run_pipeline_exception",
            Self::PipelineIdNotFound => "pipeline_id_not_found",
            Self::PipelineGetException => "pipeline_get_exception",
        };
        write!(f, "{name}")
    }
}
