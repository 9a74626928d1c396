//! # Factoryflow
//!
//! Pipeline identity and dataflow script templating over a managed
//! data-integration control plane.
//!
//! Factoryflow turns a join + projection request into named datasets, a
//! dataflow and a pipeline on the control plane, with support for:
//!
//! - **Deterministic identity**: every resource name carries the MD5 of the request
//! - **Script templating**: a dataflow script rendered from the column list
//! - **Stateless recovery**: requests rebuilt from the remote resources and script
//! - **Run tracking**: run submission and identity-checked status polling
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use factoryflow::prelude::*;
//! use std::sync::Arc;
//!
//! let config = Arc::new(FactoryConfig::from_env()?);
//! let client: Arc<dyn FactoryClient> = Arc::new(RestFactoryClient::from_config(&config)?);
//!
//! let pipelines = PipelineOrchestrator::new(client.clone(), config);
//! let created = pipelines.create_or_get(&request).await;
//!
//! let runs = RunOrchestrator::new(client);
//! let run = runs.trigger(&created.pipeline_name).await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod client;
pub mod config;
pub mod core;
pub mod errors;
pub mod identity;
pub mod orchestrator;
pub mod script;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::{FactoryClient, RestFactoryClient, TokenProvider};
    pub use crate::config::FactoryConfig;
    pub use crate::core::{
        ApiError, Dataset, PipelineRequest, PipelineResponse, PipelineSpec, RunResponse,
        RunStatus, StatusDetails,
    };
    pub use crate::errors::{ConfigError, ErrorCode, FactoryError};
    pub use crate::identity::{compute_identity, PipelineIdentity, ResourceNames};
    pub use crate::orchestrator::{PipelineOrchestrator, RunOrchestrator};
    pub use crate::script::{build_script, ScriptDocument, ScriptTemplate};
}
