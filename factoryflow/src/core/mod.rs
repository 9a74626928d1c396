//! Core domain model types for factoryflow.
//!
//! This module contains the value types exchanged with HTTP clients:
//! - Delimited-text dataset locations and their parsing options
//! - Pipeline requests and responses
//! - Run status and run responses

mod dataset;
mod response;
mod status;

pub use dataset::{ColumnDelimiter, Dataset, EscapeCharacter, QuoteCharacter};
pub use response::{
    ApiError, PipelineRequest, PipelineResponse, PipelineSpec, RunResponse, StatusDetails,
    ERROR_SOURCE,
};
pub use status::RunStatus;
