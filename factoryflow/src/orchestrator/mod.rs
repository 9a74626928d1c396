//! Orchestration of remote pipeline resources.
//!
//! [`PipelineOrchestrator`] turns a pipeline request into datasets, a
//! dataflow and a pipeline on the control plane, and rebuilds the request
//! from those resources. [`RunOrchestrator`] starts runs and reports their
//! status. Both convert control-plane failures into response error codes at
//! their boundary; only a missing resource on fetch is returned as an error.

mod pipeline;
mod run;

pub use pipeline::{PipelineOrchestrator, DATA_FLOW_DESCRIPTION};
pub use run::RunOrchestrator;

#[cfg(test)]
mod integration_tests;
