//! Remote resource names derived from a pipeline identity.

use serde::{Deserialize, Serialize};

use super::hasher::PipelineIdentity;

/// Prefix of pipeline names.
pub const PIPELINE_PREFIX: &str = "Pipeline";
/// Prefix of source dataset names.
pub const SOURCE_DATASET_PREFIX: &str = "SourceDataset";
/// Prefix of join dataset names.
pub const JOIN_DATASET_PREFIX: &str = "JoinDataset";
/// Prefix of sink dataset names.
pub const SINK_DATASET_PREFIX: &str = "SinkDataset";
/// Prefix of dataflow names.
pub const DATA_FLOW_PREFIX: &str = "DataFlow-";
/// Prefix of the join stage inside the dataflow script.
pub const JOIN_FLOW_PREFIX: &str = "JoinFlow";
/// Prefix of the select stage inside the dataflow script.
pub const SELECT_FLOW_PREFIX: &str = "SelectFlow";
/// Name of the single activity of every pipeline.
pub const ACTIVITY_NAME: &str = "Activity";
/// Run parameter and annotation key carrying the identity.
pub const IDENTITY_PARAMETER: &str = "Pipeline_id";

/// Every remote name belonging to one logical pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNames {
    /// The identity the names are derived from.
    pub identity: PipelineIdentity,
    /// `SourceDataset<id>`
    pub source_dataset: String,
    /// `JoinDataset<id>`
    pub join_dataset: String,
    /// `SinkDataset<id>`
    pub sink_dataset: String,
    /// `JoinFlow<id>`
    pub join_flow: String,
    /// `SelectFlow<id>`
    pub select_flow: String,
    /// `DataFlow-<id>`
    pub data_flow: String,
    /// `Pipeline<id>`
    pub pipeline: String,
}

impl ResourceNames {
    /// Derives all names for an identity.
    #[must_use]
    pub fn new(identity: &PipelineIdentity) -> Self {
        Self {
            identity: identity.clone(),
            source_dataset: format!("{SOURCE_DATASET_PREFIX}{identity}"),
            join_dataset: format!("{JOIN_DATASET_PREFIX}{identity}"),
            sink_dataset: format!("{SINK_DATASET_PREFIX}{identity}"),
            join_flow: format!("{JOIN_FLOW_PREFIX}{identity}"),
            select_flow: format!("{SELECT_FLOW_PREFIX}{identity}"),
            data_flow: format!("{DATA_FLOW_PREFIX}{identity}"),
            pipeline: format!("{PIPELINE_PREFIX}{identity}"),
        }
    }

    /// Re-derives all names from a pipeline name.
    #[must_use]
    pub fn from_pipeline_name(pipeline_name: &str) -> Self {
        Self::new(&PipelineIdentity::from_pipeline_name(pipeline_name))
    }

    /// The `Pipeline_id:<id>` annotation attached to the remote pipeline.
    #[must_use]
    pub fn identity_annotation(&self) -> String {
        format!("{IDENTITY_PARAMETER}:{}", self.identity)
    }
}

/// Reads the identity out of a list of annotations.
///
/// Returns the value of the first `Pipeline_id:` annotation, if any.
#[must_use]
pub fn identity_from_annotations<S: AsRef<str>>(annotations: &[S]) -> Option<PipelineIdentity> {
    let prefix = format!("{IDENTITY_PARAMETER}:");
    annotations
        .iter()
        .find_map(|a| a.as_ref().strip_prefix(prefix.as_str()))
        .map(PipelineIdentity::new)
}
