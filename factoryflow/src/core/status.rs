//! Pipeline run status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The execution status of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run accepted but not yet scheduled.
    Pending,
    /// Run waiting for compute.
    Queued,
    /// Run executing.
    InProgress,
    /// Run completed successfully.
    Succeeded,
    /// Run failed, was cancelled, or could not be inspected.
    Failed,
}

impl Default for RunStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Queued => write!(f, "Queued"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

impl RunStatus {
    /// Maps a control-plane run status onto the local enumeration.
    ///
    /// `Canceling` is still running; `Cancelled` ends as `Failed`.
    /// Unrecognised values are reported as `Pending`.
    #[must_use]
    pub fn from_remote(status: &str) -> Self {
        match status {
            "Queued" => Self::Queued,
            "InProgress" | "Canceling" => Self::InProgress,
            "Succeeded" => Self::Succeeded,
            "Failed" | "Cancelled" => Self::Failed,
            _ => Self::Pending,
        }
    }

    /// Returns true if the status represents a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Returns true if the status indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}
