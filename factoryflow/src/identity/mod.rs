//! Deterministic pipeline identity.
//!
//! A logical pipeline is identified by the MD5 of its structural inputs.
//! The identity is never stored on its own: it is embedded in every remote
//! resource name and in an annotation on the remote pipeline, and is
//! recomputed from the pipeline name whenever it is needed.

mod hasher;
mod names;

pub use hasher::{compute_identity, identity_text, PipelineIdentity, FIELD_SEPARATOR};
pub use names::{
    identity_from_annotations, ResourceNames, ACTIVITY_NAME, DATA_FLOW_PREFIX,
    IDENTITY_PARAMETER, JOIN_DATASET_PREFIX, JOIN_FLOW_PREFIX, PIPELINE_PREFIX,
    SELECT_FLOW_PREFIX, SINK_DATASET_PREFIX, SOURCE_DATASET_PREFIX,
};
