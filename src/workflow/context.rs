//! Replay-aware orchestration context
//!
//! The context hands out deterministic sequence numbers as the coordinator
//! schedules steps. A step whose outcome is already in history is replayed
//! without side effects; everything else executes live through the activity
//! registry and has its outcome appended to the log. Resuming a run is
//! therefore just re-running the coordinator against the stored history:
//! it fast-forwards through recorded outcomes and goes live at the first
//! un-replayed point.

use super::activity::{execute_with_retry, ActivityRegistry, RetryPolicy};
use super::errors::{StepError, WorkflowError};
use super::history::{HistoryEvent, HistoryStore};
use futures::future::join_all;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Recorded knowledge about a sequence position, rebuilt from history
struct StepRecord {
    step: String,
    outcome: Option<Result<Value, StepError>>,
}

/// A scheduled step awaiting [`OrchestrationContext::join_all`]
#[derive(Debug)]
pub struct StepTask {
    seq: u64,
    step: String,
    state: TaskState,
}

#[derive(Debug)]
enum TaskState {
    /// Outcome already in history; no execution happens.
    Replayed(Result<Value, StepError>),
    /// Not yet (or not completely) executed; runs live on join.
    Pending {
        input: Value,
        already_scheduled: bool,
    },
}

pub struct OrchestrationContext {
    instance_id: Uuid,
    registry: Arc<ActivityRegistry>,
    store: Arc<dyn HistoryStore>,
    retry: RetryPolicy,
    records: HashMap<u64, StepRecord>,
    next_seq: u64,
}

impl OrchestrationContext {
    pub fn new(
        instance_id: Uuid,
        history: &[HistoryEvent],
        registry: Arc<ActivityRegistry>,
        store: Arc<dyn HistoryStore>,
        retry: RetryPolicy,
    ) -> Self {
        let mut records: HashMap<u64, StepRecord> = HashMap::new();
        for event in history {
            match event {
                HistoryEvent::StepScheduled { seq, step, .. } => {
                    records.entry(*seq).or_insert_with(|| StepRecord {
                        step: step.clone(),
                        outcome: None,
                    });
                }
                HistoryEvent::StepCompleted { seq, step, output, .. } => {
                    records.insert(
                        *seq,
                        StepRecord {
                            step: step.clone(),
                            outcome: Some(Ok(output.clone())),
                        },
                    );
                }
                HistoryEvent::StepFailed { seq, step, error, .. } => {
                    records.insert(
                        *seq,
                        StepRecord {
                            step: step.clone(),
                            outcome: Some(Err(error.clone())),
                        },
                    );
                }
                _ => {}
            }
        }

        Self {
            instance_id,
            registry,
            store,
            retry,
            records,
            next_seq: 0,
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Assign the next sequence number to `step`. If history holds a record
    /// at this position it must name the same step, otherwise the run has
    /// diverged and cannot be trusted.
    pub fn schedule(&mut self, step: &str, input: Value) -> Result<StepTask, WorkflowError> {
        let seq = self.next_seq;
        self.next_seq += 1;

        match self.records.get(&seq) {
            Some(record) if record.step != step => Err(WorkflowError::HistoryDivergence {
                seq,
                recorded: record.step.clone(),
                scheduled: step.to_string(),
            }),
            Some(record) => match &record.outcome {
                Some(outcome) => {
                    debug!(seq, step, "replaying recorded step outcome");
                    Ok(StepTask {
                        seq,
                        step: step.to_string(),
                        state: TaskState::Replayed(outcome.clone()),
                    })
                }
                // scheduled but never finished: re-execute (at-least-once)
                None => Ok(StepTask {
                    seq,
                    step: step.to_string(),
                    state: TaskState::Pending {
                        input,
                        already_scheduled: true,
                    },
                }),
            },
            None => Ok(StepTask {
                seq,
                step: step.to_string(),
                state: TaskState::Pending {
                    input,
                    already_scheduled: false,
                },
            }),
        }
    }

    /// All-or-nothing join over a batch of scheduled steps. Pending tasks
    /// are spawned onto the runtime's worker pool and run in parallel;
    /// outcomes are appended to history in sequence order. Returns outputs
    /// in scheduling order, or the lowest-sequence failure.
    pub async fn join_all(&mut self, tasks: Vec<StepTask>) -> Result<Vec<Value>, WorkflowError> {
        // Newly scheduled steps are persisted before any of them runs; a
        // crash mid-batch must leave the complete schedule behind.
        let mut scheduled_events = Vec::new();
        let mut replayed = Vec::new();
        let mut pending = Vec::new();
        for task in tasks {
            match task.state {
                TaskState::Replayed(outcome) => {
                    replayed.push((task.seq, task.step, outcome));
                }
                TaskState::Pending {
                    input,
                    already_scheduled,
                } => {
                    let activity = self
                        .registry
                        .get(&task.step)
                        .ok_or_else(|| WorkflowError::UnknownStep(task.step.clone()))?;
                    if !already_scheduled {
                        scheduled_events.push(HistoryEvent::step_scheduled(
                            task.seq,
                            &task.step,
                            input.clone(),
                        ));
                    }
                    pending.push((task.seq, task.step, activity, input));
                }
            }
        }
        if !scheduled_events.is_empty() {
            self.store.append(self.instance_id, scheduled_events).await?;
        }

        let spawned: Vec<_> = pending
            .into_iter()
            .map(|(seq, step, activity, input)| {
                let retry = self.retry.clone();
                tokio::spawn(async move {
                    let outcome =
                        execute_with_retry(activity.as_ref(), &step, &input, &retry).await;
                    (seq, step, outcome)
                })
            })
            .collect();

        let mut results: Vec<(u64, String, Result<Value, StepError>, bool)> = replayed
            .into_iter()
            .map(|(seq, step, outcome)| (seq, step, outcome, false))
            .collect();
        for joined in join_all(spawned).await {
            let (seq, step, outcome) = joined.map_err(|err| {
                WorkflowError::Step(StepError::Internal {
                    step: "join".to_string(),
                    reason: err.to_string(),
                })
            })?;
            results.push((seq, step, outcome, true));
        }
        // scheduling order is ascending sequence order
        results.sort_by_key(|(seq, _, _, _)| *seq);

        let outcome_events: Vec<HistoryEvent> = results
            .iter()
            .filter(|(_, _, _, live)| *live)
            .map(|(seq, step, outcome, _)| match outcome {
                Ok(output) => HistoryEvent::step_completed(*seq, step, output.clone()),
                Err(error) => HistoryEvent::step_failed(*seq, step, error.clone()),
            })
            .collect();
        if !outcome_events.is_empty() {
            self.store.append(self.instance_id, outcome_events).await?;
        }

        // deterministic failure selection: lowest sequence number wins
        for (_, _, outcome, _) in &results {
            if let Err(error) = outcome {
                return Err(WorkflowError::Step(error.clone()));
            }
        }

        Ok(results
            .into_iter()
            .filter_map(|(_, _, outcome, _)| outcome.ok())
            .collect())
    }

    /// Schedule one step and join on it.
    pub async fn call(&mut self, step: &str, input: Value) -> Result<Value, WorkflowError> {
        let task = self.schedule(step, input)?;
        let outputs = self.join_all(vec![task]).await?;
        outputs.into_iter().next().ok_or_else(|| {
            WorkflowError::Step(StepError::Internal {
                step: step.to_string(),
                reason: "join returned no output".to_string(),
            })
        })
    }
}
