//! Workflow execution engine
//!
//! Loads an instance's history, replays the coordinator against it, and
//! records the terminal outcome. Completed instances short-circuit: their
//! recorded result is returned without re-running anything.

use super::activity::{ActivityRegistry, RetryPolicy};
use super::context::OrchestrationContext;
use super::coordinator::run_word_frequency;
use super::errors::WorkflowError;
use super::history::{HistoryEvent, HistoryStore};
use super::run::{RunRegistry, RunStage};
use crate::pipeline::{DocumentSet, FrequencyTable};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub struct WorkflowEngine {
    registry: Arc<ActivityRegistry>,
    store: Arc<dyn HistoryStore>,
    runs: RunRegistry,
    retry: RetryPolicy,
}

impl WorkflowEngine {
    pub fn new(
        registry: ActivityRegistry,
        store: Arc<dyn HistoryStore>,
        runs: RunRegistry,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            store,
            runs,
            retry,
        }
    }

    pub fn runs(&self) -> &RunRegistry {
        &self.runs
    }

    pub fn store(&self) -> Arc<dyn HistoryStore> {
        self.store.clone()
    }

    /// Execute (or resume) one instance to its terminal state.
    pub async fn execute(
        &self,
        instance_id: Uuid,
        input: DocumentSet,
    ) -> Result<FrequencyTable, WorkflowError> {
        let history = self.store.load(instance_id).await?;

        // terminal outcomes are replayed, never recomputed
        for event in &history {
            match event {
                HistoryEvent::OrchestrationCompleted { output, .. } => {
                    let table: FrequencyTable = serde_json::from_value(output.clone())?;
                    self.runs.complete(instance_id, table.clone()).await;
                    info!(%instance_id, "instance already complete, replaying recorded output");
                    return Ok(table);
                }
                HistoryEvent::OrchestrationFailed { stage, error, .. } => {
                    self.runs.fail(instance_id, *stage, error.clone()).await;
                    return Err(error.clone().into());
                }
                _ => {}
            }
        }

        let mut ctx = OrchestrationContext::new(
            instance_id,
            &history,
            self.registry.clone(),
            self.store.clone(),
            self.retry.clone(),
        );

        match run_word_frequency(&mut ctx, &input, &self.runs).await {
            Ok(table) => {
                let event = HistoryEvent::orchestration_completed(serde_json::to_value(&table)?);
                self.store.append(instance_id, vec![event]).await?;
                self.runs.complete(instance_id, table.clone()).await;
                info!(%instance_id, words = table.len(), "workflow complete");
                Ok(table)
            }
            Err(error) => {
                // the stage the coordinator last entered is the failing one
                let stage = self
                    .runs
                    .get(instance_id)
                    .await
                    .map(|run| run.stage)
                    .unwrap_or(RunStage::Gathering);
                let step_error = error.into_step_error();

                let event = HistoryEvent::orchestration_failed(stage, step_error.clone());
                if let Err(store_error) = self.store.append(instance_id, vec![event]).await {
                    warn!(%instance_id, %store_error, "failed to record terminal failure");
                }
                self.runs.fail(instance_id, stage, step_error.clone()).await;
                warn!(%instance_id, %stage, error = %step_error, "workflow failed");
                Err(step_error.into())
            }
        }
    }
}
