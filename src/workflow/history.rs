//! Append-only history log for workflow instances
//!
//! The history is the replay source: a resumed coordinator re-runs against
//! these events and only executes steps with no recorded outcome. Files
//! written by the JSON store are human-readable and safe to inspect.

use super::errors::{StepError, WorkflowError};
use crate::pipeline::DocumentSet;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use uuid::Uuid;

/// One entry in an instance's execution history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HistoryEvent {
    OrchestrationStarted {
        instance_id: Uuid,
        input: DocumentSet,
        recorded_at: DateTime<Utc>,
    },
    StepScheduled {
        seq: u64,
        step: String,
        input: Value,
        recorded_at: DateTime<Utc>,
    },
    StepCompleted {
        seq: u64,
        step: String,
        output: Value,
        recorded_at: DateTime<Utc>,
    },
    StepFailed {
        seq: u64,
        step: String,
        error: StepError,
        recorded_at: DateTime<Utc>,
    },
    OrchestrationCompleted {
        output: Value,
        recorded_at: DateTime<Utc>,
    },
    OrchestrationFailed {
        stage: super::run::RunStage,
        error: StepError,
        recorded_at: DateTime<Utc>,
    },
}

impl HistoryEvent {
    pub fn orchestration_started(instance_id: Uuid, input: DocumentSet) -> Self {
        Self::OrchestrationStarted {
            instance_id,
            input,
            recorded_at: Utc::now(),
        }
    }

    pub fn step_scheduled(seq: u64, step: &str, input: Value) -> Self {
        Self::StepScheduled {
            seq,
            step: step.to_string(),
            input,
            recorded_at: Utc::now(),
        }
    }

    pub fn step_completed(seq: u64, step: &str, output: Value) -> Self {
        Self::StepCompleted {
            seq,
            step: step.to_string(),
            output,
            recorded_at: Utc::now(),
        }
    }

    pub fn step_failed(seq: u64, step: &str, error: StepError) -> Self {
        Self::StepFailed {
            seq,
            step: step.to_string(),
            error,
            recorded_at: Utc::now(),
        }
    }

    pub fn orchestration_completed(output: Value) -> Self {
        Self::OrchestrationCompleted {
            output,
            recorded_at: Utc::now(),
        }
    }

    pub fn orchestration_failed(stage: super::run::RunStage, error: StepError) -> Self {
        Self::OrchestrationFailed {
            stage,
            error,
            recorded_at: Utc::now(),
        }
    }
}

/// Persistence seam for instance histories. `load` of an unknown instance
/// returns an empty history, not an error; callers that need the instance to
/// exist check for the start event.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn load(&self, instance_id: Uuid) -> Result<Vec<HistoryEvent>, WorkflowError>;
    async fn append(
        &self,
        instance_id: Uuid,
        events: Vec<HistoryEvent>,
    ) -> Result<(), WorkflowError>;
}

/// History kept in process memory; gone on restart.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    histories: RwLock<HashMap<Uuid, Vec<HistoryEvent>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn load(&self, instance_id: Uuid) -> Result<Vec<HistoryEvent>, WorkflowError> {
        Ok(self
            .histories
            .read()
            .await
            .get(&instance_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(
        &self,
        instance_id: Uuid,
        events: Vec<HistoryEvent>,
    ) -> Result<(), WorkflowError> {
        self.histories
            .write()
            .await
            .entry(instance_id)
            .or_default()
            .extend(events);
        Ok(())
    }
}

/// One pretty-printed JSON file per instance under a state directory.
pub struct JsonHistoryStore {
    dir: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, instance_id: Uuid) -> PathBuf {
        self.dir.join(format!("{instance_id}.json"))
    }
}

#[async_trait]
impl HistoryStore for JsonHistoryStore {
    async fn load(&self, instance_id: Uuid) -> Result<Vec<HistoryEvent>, WorkflowError> {
        let path = self.path_for(instance_id);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(WorkflowError::Store(format!(
                "reading {}: {err}",
                path.display()
            ))),
        }
    }

    async fn append(
        &self,
        instance_id: Uuid,
        events: Vec<HistoryEvent>,
    ) -> Result<(), WorkflowError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| WorkflowError::Store(format!("creating {}: {err}", self.dir.display())))?;

        let mut history = self.load(instance_id).await?;
        history.extend(events);

        let path = self.path_for(instance_id);
        let contents = serde_json::to_string_pretty(&history)?;
        tokio::fs::write(&path, contents)
            .await
            .map_err(|err| WorkflowError::Store(format!("writing {}: {err}", path.display())))
    }
}
