//! In-memory control plane.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::client::{
    CreateRunResponse, DataFlowResource, DatasetResource, FactoryClient, LinkedServiceResource,
    PipelineResource, PipelineRun,
};
use crate::errors::FactoryError;
use crate::utils::now_utc;

#[derive(Debug, Default)]
struct State {
    datasets: HashMap<String, DatasetResource>,
    linked_services: HashMap<String, LinkedServiceResource>,
    data_flows: HashMap<String, DataFlowResource>,
    pipelines: HashMap<String, PipelineResource>,
    runs: HashMap<String, PipelineRun>,
    calls: Vec<String>,
}

/// A [`FactoryClient`] that keeps every resource in memory.
///
/// Runs are created `Queued` and stay there until a test moves them with
/// [`InMemoryFactoryClient::set_run_status`] or
/// [`InMemoryFactoryClient::complete_run`].
#[derive(Debug, Default)]
pub struct InMemoryFactoryClient {
    state: Mutex<State>,
}

impl InMemoryFactoryClient {
    /// Creates an empty control plane.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a blob linked service.
    #[must_use]
    pub fn with_linked_service(self, name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        self.state
            .lock()
            .linked_services
            .insert(name.into(), LinkedServiceResource::blob_storage(endpoint));
        self
    }

    /// Returns a stored pipeline.
    #[must_use]
    pub fn pipeline(&self, name: &str) -> Option<PipelineResource> {
        self.state.lock().pipelines.get(name).cloned()
    }

    /// Returns a stored dataset.
    #[must_use]
    pub fn dataset(&self, name: &str) -> Option<DatasetResource> {
        self.state.lock().datasets.get(name).cloned()
    }

    /// Returns a stored dataflow.
    #[must_use]
    pub fn data_flow(&self, name: &str) -> Option<DataFlowResource> {
        self.state.lock().data_flows.get(name).cloned()
    }

    /// Returns a stored run.
    #[must_use]
    pub fn run(&self, run_id: &str) -> Option<PipelineRun> {
        self.state.lock().runs.get(run_id).cloned()
    }

    /// Number of stored pipelines.
    #[must_use]
    pub fn pipeline_count(&self) -> usize {
        self.state.lock().pipelines.len()
    }

    /// Operations received so far, as `operation:name`.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Replaces the script of a stored dataflow.
    pub fn set_script(&self, name: &str, script: impl Into<String>) {
        if let Some(flow) = self.state.lock().data_flows.get_mut(name) {
            flow.properties.type_properties.script = Some(script.into());
        }
    }

    /// Sets the remote status string of a run.
    pub fn set_run_status(&self, run_id: &str, status: &str) {
        if let Some(run) = self.state.lock().runs.get_mut(run_id) {
            run.status = status.to_string();
        }
    }

    /// Replaces the annotations of a run.
    pub fn set_run_annotations(&self, run_id: &str, annotations: Option<Vec<String>>) {
        if let Some(run) = self.state.lock().runs.get_mut(run_id) {
            run.annotations = annotations;
        }
    }

    /// Ends a run with the given status and duration.
    pub fn complete_run(&self, run_id: &str, status: &str, duration_in_ms: i64) {
        if let Some(run) = self.state.lock().runs.get_mut(run_id) {
            run.status = status.to_string();
            run.run_end = Some(now_utc());
            run.duration_in_ms = Some(duration_in_ms);
        }
    }

    fn record(&self, operation: &str, name: &str) -> parking_lot::MutexGuard<'_, State> {
        let mut state = self.state.lock();
        state.calls.push(format!("{operation}:{name}"));
        state
    }
}

fn not_found(kind: &str, name: &str) -> FactoryError {
    FactoryError::not_found(name, format!("{kind} '{name}' not found"))
}

#[async_trait]
impl FactoryClient for InMemoryFactoryClient {
    async fn create_or_update_dataset(
        &self,
        name: &str,
        dataset: &DatasetResource,
    ) -> Result<Option<DatasetResource>, FactoryError> {
        let mut state = self.record("create_or_update_dataset", name);
        let mut stored = dataset.clone();
        stored.name = Some(name.to_string());
        state.datasets.insert(name.to_string(), stored.clone());
        Ok(Some(stored))
    }

    async fn get_dataset(&self, name: &str) -> Result<DatasetResource, FactoryError> {
        let state = self.record("get_dataset", name);
        state
            .datasets
            .get(name)
            .cloned()
            .ok_or_else(|| not_found("Dataset", name))
    }

    async fn get_linked_service(&self, name: &str) -> Result<LinkedServiceResource, FactoryError> {
        let state = self.record("get_linked_service", name);
        state
            .linked_services
            .get(name)
            .cloned()
            .ok_or_else(|| not_found("LinkedService", name))
    }

    async fn create_or_update_data_flow(
        &self,
        name: &str,
        data_flow: &DataFlowResource,
    ) -> Result<Option<DataFlowResource>, FactoryError> {
        let mut state = self.record("create_or_update_data_flow", name);
        let mut stored = data_flow.clone();
        stored.name = Some(name.to_string());
        state.data_flows.insert(name.to_string(), stored.clone());
        Ok(Some(stored))
    }

    async fn get_data_flow(&self, name: &str) -> Result<DataFlowResource, FactoryError> {
        let state = self.record("get_data_flow", name);
        state
            .data_flows
            .get(name)
            .cloned()
            .ok_or_else(|| not_found("DataFlow", name))
    }

    async fn create_or_update_pipeline(
        &self,
        name: &str,
        pipeline: &PipelineResource,
    ) -> Result<Option<PipelineResource>, FactoryError> {
        let mut state = self.record("create_or_update_pipeline", name);
        let mut stored = pipeline.clone();
        stored.name = Some(name.to_string());
        state.pipelines.insert(name.to_string(), stored.clone());
        Ok(Some(stored))
    }

    async fn get_pipeline(&self, name: &str) -> Result<PipelineResource, FactoryError> {
        let state = self.record("get_pipeline", name);
        state
            .pipelines
            .get(name)
            .cloned()
            .ok_or_else(|| not_found("Pipeline", name))
    }

    async fn create_run(
        &self,
        pipeline_name: &str,
        parameters: &HashMap<String, String>,
    ) -> Result<CreateRunResponse, FactoryError> {
        let mut state = self.record("create_run", pipeline_name);
        let annotations = state
            .pipelines
            .get(pipeline_name)
            .ok_or_else(|| not_found("Pipeline", pipeline_name))?
            .properties
            .annotations
            .clone();

        let run_id = uuid::Uuid::new_v4().to_string();
        state.runs.insert(
            run_id.clone(),
            PipelineRun {
                run_id: run_id.clone(),
                pipeline_name: Some(pipeline_name.to_string()),
                status: "Queued".to_string(),
                run_start: Some(now_utc()),
                parameters: parameters.clone(),
                annotations: Some(annotations),
                ..PipelineRun::default()
            },
        );
        Ok(CreateRunResponse {
            run_id: Some(run_id),
        })
    }

    async fn get_pipeline_run(&self, run_id: &str) -> Result<PipelineRun, FactoryError> {
        let state = self.record("get_pipeline_run", run_id);
        state
            .runs
            .get(run_id)
            .cloned()
            .ok_or_else(|| not_found("PipelineRun", run_id))
    }
}
