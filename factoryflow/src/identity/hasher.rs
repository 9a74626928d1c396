//! Content hash of a pipeline specification.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::names::PIPELINE_PREFIX;
use crate::core::PipelineSpec;

/// Separator placed between every hashed field and between columns.
pub const FIELD_SEPARATOR: &str = "-";

/// Lowercase hex MD5 identifying a logical pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineIdentity(String);

impl PipelineIdentity {
    /// Wraps an already computed identity.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Recovers the identity embedded in a pipeline name.
    ///
    /// Every occurrence of the `Pipeline` prefix is removed; the remainder
    /// is not validated, so a foreign name simply yields an identity that
    /// matches nothing.
    #[must_use]
    pub fn from_pipeline_name(pipeline_name: &str) -> Self {
        Self(pipeline_name.replace(PIPELINE_PREFIX, ""))
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PipelineIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PipelineIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds the text that is hashed for a spec.
///
/// Source, join and sink each contribute resource group, storage account,
/// container, folder and file, followed by the columns.
#[must_use]
pub fn identity_text(spec: &PipelineSpec) -> String {
    let columns = spec.columns.join(FIELD_SEPARATOR);
    let mut parts: Vec<&str> = Vec::with_capacity(16);
    for dataset in [&spec.source, &spec.join, &spec.sink] {
        parts.extend(dataset.location_fields());
    }
    parts.push(&columns);
    parts.join(FIELD_SEPARATOR)
}

/// Computes the identity of a spec. Pure and total.
#[must_use]
pub fn compute_identity(spec: &PipelineSpec) -> PipelineIdentity {
    let digest = Md5::digest(identity_text(spec).as_bytes());
    PipelineIdentity(hex::encode(digest))
}
