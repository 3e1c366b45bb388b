//! The word-frequency orchestration function
//!
//! Drives GATHERING → fan-out MAPPING → REDUCING over the replay context.
//! Everything here must be deterministic: no clock, no randomness, no
//! direct I/O. Effects happen inside the steps the engine executes; on
//! resume this function re-runs against history and schedules the exact
//! same step sequence.

use super::context::OrchestrationContext;
use super::errors::WorkflowError;
use super::run::{RunRegistry, RunStage};
use crate::pipeline::{DocumentSet, FrequencyTable, PartialCount, WorkItem};
use tracing::info;

/// Orchestration name accepted by the run trigger
pub const WORD_FREQUENCY: &str = "word-frequency";

pub const GATHER_STEP: &str = "gather";
pub const MAP_STEP: &str = "map";
pub const REDUCE_STEP: &str = "reduce";

/// Run the pipeline to completion. Stage transitions are re-asserted during
/// replay (idempotent sets), so a polling observer sees the same progression
/// a first execution shows.
pub async fn run_word_frequency(
    ctx: &mut OrchestrationContext,
    input: &DocumentSet,
    runs: &RunRegistry,
) -> Result<FrequencyTable, WorkflowError> {
    let instance_id = ctx.instance_id();

    runs.set_stage(instance_id, RunStage::Gathering).await;
    let gathered = ctx.call(GATHER_STEP, serde_json::to_value(input)?).await?;
    let work_items: Vec<WorkItem> = serde_json::from_value(gathered)?;
    runs.record_work_items(instance_id, work_items.len()).await;
    info!(%instance_id, work_items = work_items.len(), "gather stage complete");

    runs.set_stage(instance_id, RunStage::Mapping).await;
    let mut tasks = Vec::with_capacity(work_items.len());
    for item in &work_items {
        tasks.push(ctx.schedule(MAP_STEP, serde_json::to_value(item)?)?);
    }
    let outputs = ctx.join_all(tasks).await?;
    let mut partials = Vec::with_capacity(outputs.len());
    for output in outputs {
        partials.push(serde_json::from_value::<PartialCount>(output)?);
    }
    info!(%instance_id, partials = partials.len(), "map stage complete");

    runs.set_stage(instance_id, RunStage::Reducing).await;
    let reduced = ctx.call(REDUCE_STEP, serde_json::to_value(&partials)?).await?;
    let table: FrequencyTable = serde_json::from_value(reduced)?;
    info!(%instance_id, words = table.len(), "reduce stage complete");

    Ok(table)
}
