//! Run state and metadata
//!
//! A run moves strictly forward through the stage states; there is no
//! retry or rollback transition. `Failed` is absorbing and reachable from
//! any non-terminal state; a failed run requires an external re-trigger.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PipelineError;

/// Progress of a single pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    NotStarted,
    SourceFetched,
    Synthesized,
    ImageBuilt,
    Deploying,
    Complete,
    /// Absorbing failure state naming the stage that halted the run
    Failed { stage: String, reason: String },
}

impl RunState {
    /// Position in the forward order; terminal failure has none
    fn ordinal(&self) -> Option<u8> {
        match self {
            RunState::NotStarted => Some(0),
            RunState::SourceFetched => Some(1),
            RunState::Synthesized => Some(2),
            RunState::ImageBuilt => Some(3),
            RunState::Deploying => Some(4),
            RunState::Complete => Some(5),
            RunState::Failed { .. } => None,
        }
    }

    /// Whether the run can make no further progress
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Complete | RunState::Failed { .. })
    }

    /// Advances to `next`, enforcing the strictly-forward rule
    ///
    /// `Failed` is accepted from any non-terminal state. Everything else
    /// must move forward in the stage order; backward or repeated
    /// transitions are rejected, as is any transition out of a terminal
    /// state.
    pub fn advance(&mut self, next: RunState) -> Result<(), PipelineError> {
        if self.is_terminal() {
            return Err(PipelineError::InvalidPipeline(format!(
                "run is already terminal in state {self:?}"
            )));
        }

        let allowed = match (self.ordinal(), next.ordinal()) {
            // Failure is reachable from any non-terminal state
            (_, None) => true,
            (Some(current), Some(target)) => target > current,
            (None, Some(_)) => false,
        };

        if !allowed {
            return Err(PipelineError::InvalidPipeline(format!(
                "illegal state transition {self:?} -> {next:?}"
            )));
        }

        *self = next;
        Ok(())
    }
}

/// Metadata of a single pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Unique identifier of this execution
    pub execution_id: Uuid,
    /// Source revision resolved by the source stage; absent until then
    /// (and absent entirely for local runs)
    pub commit_id: Option<String>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl RunMetadata {
    pub fn new() -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            commit_id: None,
            started_at: chrono::Utc::now(),
        }
    }
}

impl Default for RunMetadata {
    fn default() -> Self {
        Self::new()
    }
}
