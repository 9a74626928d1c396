//! Control-plane resource models.
//!
//! Only the fields this service reads or writes are modelled; unknown
//! fields returned by the service are ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::utils::Timestamp;

/// Reference to another named resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReference {
    /// Name of the referenced resource.
    pub reference_name: String,
    /// Reference kind, e.g. `LinkedServiceReference`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResourceReference {
    /// A linked service reference.
    #[must_use]
    pub fn linked_service(name: impl Into<String>) -> Self {
        Self {
            reference_name: name.into(),
            kind: "LinkedServiceReference".to_string(),
        }
    }

    /// A dataset reference.
    #[must_use]
    pub fn dataset(name: impl Into<String>) -> Self {
        Self {
            reference_name: name.into(),
            kind: "DatasetReference".to_string(),
        }
    }

    /// A dataflow reference.
    #[must_use]
    pub fn data_flow(name: impl Into<String>) -> Self {
        Self {
            reference_name: name.into(),
            kind: "DataFlowReference".to_string(),
        }
    }
}

/// Blob storage location of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobLocation {
    /// Location kind, `AzureBlobStorageLocation`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Container name.
    #[serde(default)]
    pub container: Option<String>,
    /// Folder path.
    #[serde(default)]
    pub folder_path: Option<String>,
    /// File name.
    #[serde(default)]
    pub file_name: Option<String>,
}

impl BlobLocation {
    /// Creates a blob location.
    #[must_use]
    pub fn new(
        container: impl Into<String>,
        folder_path: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            kind: "AzureBlobStorageLocation".to_string(),
            container: Some(container.into()),
            folder_path: Some(folder_path.into()),
            file_name: Some(file_name.into()),
        }
    }
}

/// Delimited-text settings of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelimitedTextProperties {
    /// File location.
    pub location: BlobLocation,
    /// Column delimiter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_delimiter: Option<String>,
    /// Quote character.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_char: Option<String>,
    /// Escape character.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escape_char: Option<String>,
    /// Header flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_row_as_header: Option<bool>,
}

/// Properties of a delimited-text dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetProperties {
    /// Dataset kind, `DelimitedText`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Linked service holding the data.
    pub linked_service_name: ResourceReference,
    /// Delimited-text settings.
    pub type_properties: DelimitedTextProperties,
}

/// A dataset resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetResource {
    /// Resource name, set by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Dataset properties.
    pub properties: DatasetProperties,
}

impl DatasetResource {
    /// Creates a delimited-text dataset.
    #[must_use]
    pub fn delimited_text(
        linked_service: impl Into<String>,
        type_properties: DelimitedTextProperties,
    ) -> Self {
        Self {
            name: None,
            properties: DatasetProperties {
                kind: "DelimitedText".to_string(),
                linked_service_name: ResourceReference::linked_service(linked_service),
                type_properties,
            },
        }
    }
}

/// Type-specific properties of a linked service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedServiceTypeProperties {
    /// Blob endpoint, e.g. `https://account.blob.core.windows.net/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_endpoint: Option<String>,
}

/// Properties of a linked service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedServiceProperties {
    /// Linked service kind, e.g. `AzureBlobStorage`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Type-specific properties.
    #[serde(default)]
    pub type_properties: LinkedServiceTypeProperties,
}

/// A linked service resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedServiceResource {
    /// Resource name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Linked service properties.
    pub properties: LinkedServiceProperties,
}

impl LinkedServiceResource {
    /// A blob storage linked service with the given endpoint.
    #[must_use]
    pub fn blob_storage(service_endpoint: impl Into<String>) -> Self {
        Self {
            name: None,
            properties: LinkedServiceProperties {
                kind: "AzureBlobStorage".to_string(),
                type_properties: LinkedServiceTypeProperties {
                    service_endpoint: Some(service_endpoint.into()),
                },
            },
        }
    }
}

/// A dataflow source or sink bound to a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFlowEndpoint {
    /// Stage name.
    pub name: String,
    /// Bound dataset.
    pub dataset: ResourceReference,
}

impl DataFlowEndpoint {
    /// A stage named after its dataset.
    #[must_use]
    pub fn for_dataset(dataset: &str) -> Self {
        Self {
            name: dataset.to_string(),
            dataset: ResourceReference::dataset(dataset),
        }
    }
}

/// A named transformation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformation {
    /// Stage name.
    pub name: String,
}

/// Mapping dataflow definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDataFlowProperties {
    /// Sources.
    #[serde(default)]
    pub sources: Vec<DataFlowEndpoint>,
    /// Sinks.
    #[serde(default)]
    pub sinks: Vec<DataFlowEndpoint>,
    /// Transformations.
    #[serde(default)]
    pub transformations: Vec<Transformation>,
    /// Script text.
    #[serde(default)]
    pub script: Option<String>,
}

/// Properties of a dataflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFlowProperties {
    /// Dataflow kind, `MappingDataFlow`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Mapping definition.
    #[serde(default)]
    pub type_properties: MappingDataFlowProperties,
}

/// A dataflow resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFlowResource {
    /// Resource name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Dataflow properties.
    pub properties: DataFlowProperties,
}

impl DataFlowResource {
    /// Script text, empty when absent.
    #[must_use]
    pub fn script(&self) -> &str {
        self.properties.type_properties.script.as_deref().unwrap_or("")
    }
}

/// Activity executing a dataflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Activity name.
    pub name: String,
    /// Activity kind, `ExecuteDataFlow`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Activity settings.
    pub type_properties: ExecuteDataFlowProperties,
}

/// Settings of an `ExecuteDataFlow` activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteDataFlowProperties {
    /// Dataflow to execute.
    pub data_flow: ResourceReference,
}

/// Declared pipeline parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    /// Parameter type, e.g. `String`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Properties of a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineProperties {
    /// Activities.
    #[serde(default)]
    pub activities: Vec<Activity>,
    /// Declared parameters.
    #[serde(default)]
    pub parameters: HashMap<String, ParameterSpec>,
    /// Free-form annotations.
    #[serde(default)]
    pub annotations: Vec<String>,
}

/// A pipeline resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResource {
    /// Resource name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Pipeline properties.
    pub properties: PipelineProperties,
}

/// Answer to a run submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRunResponse {
    /// Assigned run id.
    #[serde(default)]
    pub run_id: Option<String>,
}

/// A pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    /// Run id.
    #[serde(default)]
    pub run_id: String,
    /// Pipeline the run belongs to.
    #[serde(default)]
    pub pipeline_name: Option<String>,
    /// Remote status string.
    #[serde(default)]
    pub status: String,
    /// Run start.
    #[serde(default)]
    pub run_start: Option<Timestamp>,
    /// Run end.
    #[serde(default)]
    pub run_end: Option<Timestamp>,
    /// Duration in milliseconds.
    #[serde(default)]
    pub duration_in_ms: Option<i64>,
    /// Status message.
    #[serde(default)]
    pub message: Option<String>,
    /// Parameters the run was started with.
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    /// Annotations copied from the pipeline.
    #[serde(default)]
    pub annotations: Option<Vec<String>>,
}
