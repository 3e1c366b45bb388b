//! Host surface for starting, resuming, and observing runs

use super::engine::WorkflowEngine;
use super::errors::WorkflowError;
use super::history::HistoryEvent;
use super::run::{RunRegistry, WorkflowRun};
use crate::pipeline::{DocumentSet, FrequencyTable};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub struct WorkflowHost {
    engine: Arc<WorkflowEngine>,
}

impl WorkflowHost {
    pub fn new(engine: Arc<WorkflowEngine>) -> Self {
        Self { engine }
    }

    pub fn runs(&self) -> &RunRegistry {
        self.engine.runs()
    }

    /// Record the start event and register the run, returning the new id.
    async fn prepare(&self, documents: &DocumentSet) -> Result<Uuid, WorkflowError> {
        let instance_id = Uuid::new_v4();
        self.engine
            .store()
            .append(
                instance_id,
                vec![HistoryEvent::orchestration_started(
                    instance_id,
                    documents.clone(),
                )],
            )
            .await?;
        self.engine
            .runs()
            .insert(WorkflowRun::new(instance_id, documents.clone()))
            .await;
        info!(%instance_id, documents = documents.len(), "workflow run created");
        Ok(instance_id)
    }

    /// Start a run in the background and return its handle immediately.
    pub async fn start(&self, documents: DocumentSet) -> Result<Uuid, WorkflowError> {
        let instance_id = self.prepare(&documents).await?;
        let engine = self.engine.clone();
        tokio::spawn(async move {
            if let Err(error) = engine.execute(instance_id, documents).await {
                // already recorded in history and the run registry
                warn!(%instance_id, %error, "background run ended in failure");
            }
        });
        Ok(instance_id)
    }

    /// Run one workflow in the caller's task and return its output.
    pub async fn run_to_completion(
        &self,
        documents: DocumentSet,
    ) -> Result<FrequencyTable, WorkflowError> {
        let instance_id = self.prepare(&documents).await?;
        self.engine.execute(instance_id, documents).await
    }

    /// Resume a persisted instance: the input is re-hydrated from history,
    /// completed steps replay, and execution goes live at the first
    /// un-replayed point.
    pub async fn resume(&self, instance_id: Uuid) -> Result<FrequencyTable, WorkflowError> {
        let history = self.engine.store().load(instance_id).await?;
        let input = history
            .iter()
            .find_map(|event| match event {
                HistoryEvent::OrchestrationStarted { input, .. } => Some(input.clone()),
                _ => None,
            })
            .ok_or(WorkflowError::UnknownInstance(instance_id))?;

        if self.engine.runs().get(instance_id).await.is_none() {
            self.engine
                .runs()
                .insert(WorkflowRun::new(instance_id, input.clone()))
                .await;
        }
        info!(%instance_id, "resuming workflow run from history");
        self.engine.execute(instance_id, input).await
    }

    pub async fn status(&self, instance_id: Uuid) -> Option<WorkflowRun> {
        self.engine.runs().get(instance_id).await
    }
}
