//! Pipeline creation and recovery.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::client::{
    Activity, BlobLocation, DataFlowEndpoint, DataFlowProperties, DataFlowResource,
    DatasetResource, DelimitedTextProperties, ExecuteDataFlowProperties, FactoryClient,
    MappingDataFlowProperties, ParameterSpec, PipelineProperties, PipelineResource,
    ResourceReference, Transformation,
};
use crate::config::FactoryConfig;
use crate::core::{
    ApiError, ColumnDelimiter, Dataset, EscapeCharacter, PipelineResponse, PipelineSpec,
    QuoteCharacter,
};
use crate::errors::{ErrorCode, FactoryError};
use crate::identity::{compute_identity, ResourceNames, ACTIVITY_NAME, IDENTITY_PARAMETER};
use crate::script::{storage_account_from_endpoint, ScriptDocument, ScriptTemplate};

/// Description attached to every generated dataflow.
pub const DATA_FLOW_DESCRIPTION: &str = "Prepare Data Flow";

/// Creates pipelines from specs and rebuilds specs from remote pipelines.
///
/// The remote resources are the only state: a pipeline is `Unknown` until
/// its resources exist (`Created`), and `Runnable` once the pipeline
/// resource itself exists.
#[derive(Clone)]
pub struct PipelineOrchestrator {
    client: Arc<dyn FactoryClient>,
    config: Arc<FactoryConfig>,
}

impl std::fmt::Debug for PipelineOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOrchestrator")
            .field("factory", &self.config.datafactory_name)
            .finish_non_exhaustive()
    }
}

impl PipelineOrchestrator {
    /// Creates an orchestrator over a control-plane client.
    #[must_use]
    pub fn new(client: Arc<dyn FactoryClient>, config: Arc<FactoryConfig>) -> Self {
        Self { client, config }
    }

    /// Creates (or idempotently re-creates) all resources of a pipeline.
    ///
    /// Resources are written in dependency order: source, join and sink
    /// datasets, then the dataflow, then the pipeline. The first step that
    /// fails stops the sequence; resources already written are left in
    /// place. The request is always echoed back with the outcome.
    pub async fn create_or_get(&self, spec: &PipelineSpec) -> PipelineResponse {
        let identity = compute_identity(spec);
        let names = ResourceNames::new(&identity);
        info!(pipeline = %names.pipeline, columns = spec.columns.len(), "create_or_get: called");

        let error = match self.create_resources(spec, &names).await {
            Ok(error) => error,
            Err(err) => {
                error!(pipeline = %names.pipeline, error = %err, "create_or_get: remote failure");
                ApiError::new(ErrorCode::DataFactoryError, err.to_string())
            }
        };
        if error.is_ok() {
            info!(pipeline = %names.pipeline, "create_or_get: pipeline ready");
        } else {
            warn!(
                pipeline = %names.pipeline,
                code = %error.code,
                message = %error.message,
                "create_or_get: step failed"
            );
        }

        PipelineResponse::from_request(spec, &names.pipeline, error)
    }

    /// Writes every resource; `Ok` carries the step outcome.
    async fn create_resources(
        &self,
        spec: &PipelineSpec,
        names: &ResourceNames,
    ) -> Result<ApiError, FactoryError> {
        let source_ls = &self.config.source_linked_service;
        let sink_ls = &self.config.sink_linked_service;

        // Folder and file of the source live only in the script.
        let datasets = [
            (
                &names.source_dataset,
                dataset_resource(
                    &spec.source,
                    source_ls,
                    BlobLocation::new(&spec.source.container_name, "", ""),
                ),
            ),
            (
                &names.join_dataset,
                dataset_resource(
                    &spec.join,
                    source_ls,
                    BlobLocation::new(
                        &spec.join.container_name,
                        &spec.join.folder_path,
                        &spec.join.file_pattern_or_name,
                    ),
                ),
            ),
            (
                &names.sink_dataset,
                dataset_resource(
                    &spec.sink,
                    sink_ls,
                    BlobLocation::new(&spec.sink.container_name, &spec.sink.folder_path, ""),
                ),
            ),
        ];
        for (name, resource) in &datasets {
            debug!(dataset = %name, "create_resources: writing dataset");
            if self
                .client
                .create_or_update_dataset(name, resource)
                .await?
                .is_none()
            {
                return Ok(ApiError::new(
                    ErrorCode::DataFactoryError,
                    format!("Dataset creation failed for {name}"),
                ));
            }
        }

        let data_flow = data_flow_resource(spec, names);
        debug!(data_flow = %names.data_flow, "create_resources: writing dataflow");
        if self
            .client
            .create_or_update_data_flow(&names.data_flow, &data_flow)
            .await?
            .is_none()
        {
            return Ok(ApiError::new(
                ErrorCode::DataflowCreationError,
                format!("Pipeline Data Flow creation failed for {}", names.data_flow),
            ));
        }

        let pipeline = pipeline_resource(names);
        debug!(pipeline = %names.pipeline, "create_resources: writing pipeline");
        if self
            .client
            .create_or_update_pipeline(&names.pipeline, &pipeline)
            .await?
            .is_none()
        {
            return Ok(ApiError::new(
                ErrorCode::PipelineCreationError,
                format!("Pipeline creation failed for {}", names.pipeline),
            ));
        }

        Ok(ApiError::none())
    }

    /// Rebuilds the request that created a pipeline.
    ///
    /// A missing remote resource is returned as [`FactoryError::NotFound`].
    /// Any other failure yields a response with empty datasets and
    /// [`ErrorCode::PipelineGetException`].
    pub async fn fetch(&self, pipeline_name: &str) -> Result<PipelineResponse, FactoryError> {
        info!(pipeline = %pipeline_name, "fetch: called");
        match self.recover(pipeline_name).await {
            Ok(response) => Ok(response),
            Err(err) if err.is_not_found() => {
                warn!(pipeline = %pipeline_name, error = %err, "fetch: not found");
                Err(err)
            }
            Err(err) => {
                error!(pipeline = %pipeline_name, error = %err, "fetch: failed");
                Ok(PipelineResponse::empty(
                    &self.config.resource_group_name,
                    pipeline_name,
                    ApiError::new(
                        ErrorCode::PipelineGetException,
                        format!("Exception while getting pipeline {pipeline_name}: {err}"),
                    ),
                ))
            }
        }
    }

    async fn recover(&self, pipeline_name: &str) -> Result<PipelineResponse, FactoryError> {
        self.client.get_pipeline(pipeline_name).await?;
        let names = ResourceNames::from_pipeline_name(pipeline_name);

        let (mut source, join, mut sink) = futures::try_join!(
            self.fetch_dataset(&names.source_dataset),
            self.fetch_dataset(&names.join_dataset),
            self.fetch_dataset(&names.sink_dataset),
        )?;

        let data_flow = self.client.get_data_flow(&names.data_flow).await?;
        let script = ScriptDocument::new(data_flow.script());

        let columns = script.columns();
        if columns.is_empty() {
            warn!(data_flow = %names.data_flow, "recover: no columns found in script");
        }
        let (folder, file) = script.source_location();
        if file.is_empty() {
            warn!(data_flow = %names.data_flow, "recover: no source path found in script");
        }
        let sink_pattern = script.sink_file_pattern();
        if sink_pattern.is_empty() {
            warn!(data_flow = %names.data_flow, "recover: no sink pattern found in script");
        }
        source.folder_path = folder;
        source.file_pattern_or_name = file;
        sink.file_pattern_or_name = sink_pattern;

        Ok(PipelineResponse {
            source,
            join,
            columns,
            sink,
            pipeline_name: pipeline_name.to_string(),
            error: ApiError::none(),
        })
    }

    async fn fetch_dataset(&self, name: &str) -> Result<Dataset, FactoryError> {
        debug!(dataset = %name, "fetch_dataset: called");
        let resource = self.client.get_dataset(name).await?;
        let properties = resource.properties;
        let service = self
            .client
            .get_linked_service(&properties.linked_service_name.reference_name)
            .await?;
        let endpoint = service
            .properties
            .type_properties
            .service_endpoint
            .unwrap_or_default();

        let settings = properties.type_properties;
        let location = settings.location;
        Ok(Dataset {
            resource_group_name: self.config.resource_group_name.clone(),
            storage_account_name: storage_account_from_endpoint(&endpoint),
            container_name: location.container.unwrap_or_default(),
            folder_path: location.folder_path.unwrap_or_default(),
            file_pattern_or_name: location.file_name.unwrap_or_default(),
            first_row_as_header: settings.first_row_as_header.unwrap_or(true),
            column_delimiter: settings
                .column_delimiter
                .unwrap_or_else(|| ColumnDelimiter::default().as_str().to_string()),
            quote_char: settings
                .quote_char
                .unwrap_or_else(|| QuoteCharacter::default().as_str().to_string()),
            escape_char: settings
                .escape_char
                .unwrap_or_else(|| EscapeCharacter::default().as_str().to_string()),
        })
    }
}

fn dataset_resource(
    dataset: &Dataset,
    linked_service: &str,
    location: BlobLocation,
) -> DatasetResource {
    DatasetResource::delimited_text(
        linked_service,
        DelimitedTextProperties {
            location,
            column_delimiter: Some(dataset.column_delimiter.clone()),
            quote_char: Some(dataset.quote_char.clone()),
            escape_char: Some(dataset.escape_char.clone()),
            first_row_as_header: Some(dataset.first_row_as_header),
        },
    )
}

fn data_flow_resource(spec: &PipelineSpec, names: &ResourceNames) -> DataFlowResource {
    let script = ScriptTemplate {
        source_name: names.source_dataset.clone(),
        join_name: names.join_dataset.clone(),
        sink_name: names.sink_dataset.clone(),
        join_stage_name: names.join_flow.clone(),
        select_stage_name: names.select_flow.clone(),
        output_file_pattern: spec.sink.file_pattern_or_name.clone(),
        columns: spec.columns.clone(),
        source_folder: spec.source.folder_path.clone(),
        source_file: spec.source.file_pattern_or_name.clone(),
    }
    .render();

    DataFlowResource {
        name: None,
        properties: DataFlowProperties {
            kind: "MappingDataFlow".to_string(),
            description: Some(DATA_FLOW_DESCRIPTION.to_string()),
            type_properties: MappingDataFlowProperties {
                sources: vec![
                    DataFlowEndpoint::for_dataset(&names.source_dataset),
                    DataFlowEndpoint::for_dataset(&names.join_dataset),
                ],
                sinks: vec![DataFlowEndpoint::for_dataset(&names.sink_dataset)],
                transformations: vec![
                    Transformation {
                        name: names.join_flow.clone(),
                    },
                    Transformation {
                        name: names.select_flow.clone(),
                    },
                ],
                script: Some(script.into_string()),
            },
        },
    }
}

fn pipeline_resource(names: &ResourceNames) -> PipelineResource {
    let parameters = HashMap::from([(
        IDENTITY_PARAMETER.to_string(),
        ParameterSpec {
            kind: "String".to_string(),
            default_value: Some(names.identity.to_string()),
        },
    )]);

    PipelineResource {
        name: None,
        properties: PipelineProperties {
            activities: vec![Activity {
                name: ACTIVITY_NAME.to_string(),
                kind: "ExecuteDataFlow".to_string(),
                type_properties: ExecuteDataFlowProperties {
                    data_flow: ResourceReference::data_flow(&names.data_flow),
                },
            }],
            parameters,
            annotations: vec![names.identity_annotation()],
        },
    }
}
