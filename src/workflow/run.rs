//! Workflow run state and the registry the status endpoint reads
//!
//! Stage transitions are owned by the coordinator and engine: the mutation
//! methods are crate-private, everything else only observes snapshots.

use super::errors::StepError;
use crate::pipeline::{DocumentSet, FrequencyTable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Lifecycle stage of a workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStage {
    Gathering,
    Mapping,
    Reducing,
    Complete,
    Failed,
}

impl RunStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStage::Complete | RunStage::Failed)
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Gathering => "GATHERING",
            RunStage::Mapping => "MAPPING",
            RunStage::Reducing => "REDUCING",
            RunStage::Complete => "COMPLETE",
            RunStage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// The stage a run failed in, and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFailure {
    pub stage: RunStage,
    pub error: StepError,
}

/// One run of the gather → map → reduce pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub instance_id: Uuid,
    pub stage: RunStage,
    pub input: DocumentSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Fan-out width, recorded when the gather stage completes
    pub work_items: Option<usize>,
    /// Present once the run is COMPLETE
    pub output: Option<FrequencyTable>,
    /// Present once the run is FAILED
    pub failure: Option<RunFailure>,
}

impl WorkflowRun {
    pub fn new(instance_id: Uuid, input: DocumentSet) -> Self {
        let now = Utc::now();
        Self {
            instance_id,
            stage: RunStage::Gathering,
            input,
            created_at: now,
            updated_at: now,
            work_items: None,
            output: None,
            failure: None,
        }
    }
}

/// Shared map of live and finished runs
#[derive(Clone, Default)]
pub struct RunRegistry {
    runs: Arc<RwLock<HashMap<Uuid, WorkflowRun>>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, run: WorkflowRun) {
        self.runs.write().await.insert(run.instance_id, run);
    }

    pub async fn get(&self, instance_id: Uuid) -> Option<WorkflowRun> {
        self.runs.read().await.get(&instance_id).cloned()
    }

    pub(crate) async fn set_stage(&self, instance_id: Uuid, stage: RunStage) {
        if let Some(run) = self.runs.write().await.get_mut(&instance_id) {
            run.stage = stage;
            run.updated_at = Utc::now();
        }
    }

    pub(crate) async fn record_work_items(&self, instance_id: Uuid, count: usize) {
        if let Some(run) = self.runs.write().await.get_mut(&instance_id) {
            run.work_items = Some(count);
            run.updated_at = Utc::now();
        }
    }

    pub(crate) async fn complete(&self, instance_id: Uuid, output: FrequencyTable) {
        if let Some(run) = self.runs.write().await.get_mut(&instance_id) {
            run.stage = RunStage::Complete;
            run.output = Some(output);
            run.updated_at = Utc::now();
        }
    }

    pub(crate) async fn fail(&self, instance_id: Uuid, stage: RunStage, error: StepError) {
        if let Some(run) = self.runs.write().await.get_mut(&instance_id) {
            run.stage = RunStage::Failed;
            run.failure = Some(RunFailure { stage, error });
            run.updated_at = Utc::now();
        }
    }
}
