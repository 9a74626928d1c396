//! Control-plane client.
//!
//! [`FactoryClient`] is the only seam between the orchestrators and the
//! managed data-integration service. A client is bound to one factory, so
//! every operation addresses a resource by name alone.
//!
//! Create/update operations return `Ok(None)` when the service answers
//! without a resource body; orchestrators treat that as a failed step.

mod credential;
mod models;
mod rest;

use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::FactoryError;

pub use credential::{
    token_provider_from_config, ClientSecretCredential, StaticTokenProvider, TokenProvider,
    MANAGEMENT_SCOPE,
};
pub use models::{
    Activity, BlobLocation, CreateRunResponse, DataFlowEndpoint, DataFlowProperties,
    DataFlowResource, DatasetProperties, DatasetResource, DelimitedTextProperties,
    ExecuteDataFlowProperties, LinkedServiceProperties, LinkedServiceResource,
    LinkedServiceTypeProperties, MappingDataFlowProperties, ParameterSpec, PipelineProperties,
    PipelineResource, PipelineRun, ResourceReference, Transformation,
};
pub use rest::RestFactoryClient;

/// Operations against the data factory control plane.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FactoryClient: Send + Sync {
    /// Creates or replaces a dataset.
    async fn create_or_update_dataset(
        &self,
        name: &str,
        dataset: &DatasetResource,
    ) -> Result<Option<DatasetResource>, FactoryError>;

    /// Fetches a dataset.
    async fn get_dataset(&self, name: &str) -> Result<DatasetResource, FactoryError>;

    /// Fetches a linked service.
    async fn get_linked_service(&self, name: &str) -> Result<LinkedServiceResource, FactoryError>;

    /// Creates or replaces a dataflow.
    async fn create_or_update_data_flow(
        &self,
        name: &str,
        data_flow: &DataFlowResource,
    ) -> Result<Option<DataFlowResource>, FactoryError>;

    /// Fetches a dataflow.
    async fn get_data_flow(&self, name: &str) -> Result<DataFlowResource, FactoryError>;

    /// Creates or replaces a pipeline.
    async fn create_or_update_pipeline(
        &self,
        name: &str,
        pipeline: &PipelineResource,
    ) -> Result<Option<PipelineResource>, FactoryError>;

    /// Fetches a pipeline.
    async fn get_pipeline(&self, name: &str) -> Result<PipelineResource, FactoryError>;

    /// Submits a run of a pipeline.
    async fn create_run(
        &self,
        pipeline_name: &str,
        parameters: &HashMap<String, String>,
    ) -> Result<CreateRunResponse, FactoryError>;

    /// Fetches a pipeline run.
    async fn get_pipeline_run(&self, run_id: &str) -> Result<PipelineRun, FactoryError>;
}
