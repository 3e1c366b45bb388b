//! Structured error types for workflow execution
//!
//! `StepError` is the serializable failure kind a step surfaces; it is what
//! the history log records and what a FAILED run reports. `WorkflowError`
//! adds the engine-level failures that never belong in a step outcome.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Failure kind of a pipeline step, carrying the offending identifier
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepError {
    /// Document source unreachable or returned an error
    #[error("fetch failed for document '{document}': {reason}")]
    FetchFailed { document: String, reason: String },

    /// Tokenization/counting rejected its input
    #[error("map failed for bucket {bucket_id} of '{document}': {reason}")]
    MapFailed {
        document: String,
        bucket_id: u64,
        reason: String,
    },

    /// Merge step invariant violation, e.g. malformed partial-count shape
    #[error("reduce failed: {reason}")]
    ReduceFailed { reason: String },

    #[error("step '{step}' failed: {reason}")]
    Internal { step: String, reason: String },
}

/// Engine-level failures of workflow execution
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Step(#[from] StepError),

    /// The orchestrator scheduled a different step than history recorded at
    /// the same position; the run can no longer be replayed safely.
    #[error("history divergence at step {seq}: recorded '{recorded}', scheduled '{scheduled}'")]
    HistoryDivergence {
        seq: u64,
        recorded: String,
        scheduled: String,
    },

    #[error("no activity registered for step '{0}'")]
    UnknownStep(String),

    #[error("no history for instance {0}")]
    UnknownInstance(Uuid),

    #[error("history store error: {0}")]
    Store(String),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl WorkflowError {
    /// Collapse to the serializable step-level kind for run reporting.
    pub fn into_step_error(self) -> StepError {
        match self {
            WorkflowError::Step(error) => error,
            other => StepError::Internal {
                step: "workflow".to_string(),
                reason: other.to_string(),
            },
        }
    }
}
