//! Engine activities wrapping the pure pipeline functions

use super::activity::{Activity, ActivityFailure, ActivityRegistry};
use super::coordinator::{GATHER_STEP, MAP_STEP, REDUCE_STEP};
use super::errors::StepError;
use crate::config::{default_stopwords, AnalysisConfig};
use crate::fetch::DocumentFetcher;
use crate::pipeline::{gather, reduce, tokenize};
use crate::pipeline::{DocumentSet, PartialCount, WorkItem};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

fn encode<T: Serialize>(step: &str, value: &T) -> Result<Value, ActivityFailure> {
    serde_json::to_value(value).map_err(|err| {
        ActivityFailure::permanent(StepError::Internal {
            step: step.to_string(),
            reason: err.to_string(),
        })
    })
}

/// Fetches and bucketizes every document of the set, in set order.
pub struct GatherActivity {
    fetcher: Arc<dyn DocumentFetcher>,
    config: AnalysisConfig,
}

impl GatherActivity {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, config: AnalysisConfig) -> Self {
        Self { fetcher, config }
    }
}

#[async_trait]
impl Activity for GatherActivity {
    async fn run(&self, input: Value) -> Result<Value, ActivityFailure> {
        let documents: DocumentSet = serde_json::from_value(input).map_err(|err| {
            ActivityFailure::permanent(StepError::Internal {
                step: GATHER_STEP.to_string(),
                reason: err.to_string(),
            })
        })?;

        let work_items = gather::gather(&documents, self.fetcher.as_ref(), self.config.bucket_size)
            .await
            .map_err(|failed| {
                // network errors are worth retrying
                ActivityFailure::transient(StepError::FetchFailed {
                    document: failed.document,
                    reason: failed.source.to_string(),
                })
            })?;

        encode(GATHER_STEP, &work_items)
    }
}

/// Counts one bucket against the injected stopword set.
pub struct MapActivity {
    config: AnalysisConfig,
    stopwords: &'static HashSet<&'static str>,
}

impl MapActivity {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            stopwords: default_stopwords(),
        }
    }
}

#[async_trait]
impl Activity for MapActivity {
    async fn run(&self, input: Value) -> Result<Value, ActivityFailure> {
        let item: WorkItem = serde_json::from_value(input.clone()).map_err(|err| {
            let document = input
                .get("document_name")
                .and_then(Value::as_str)
                .unwrap_or("<unknown>")
                .to_string();
            let bucket_id = input.get("bucket_id").and_then(Value::as_u64).unwrap_or(0);
            ActivityFailure::permanent(StepError::MapFailed {
                document,
                bucket_id,
                reason: err.to_string(),
            })
        })?;

        let partial = tokenize::count_bucket(&item, self.stopwords, self.config.min_word_len);
        encode(MAP_STEP, &partial)
    }
}

/// Merges the ordered partial counts into the final table.
pub struct ReduceActivity;

#[async_trait]
impl Activity for ReduceActivity {
    async fn run(&self, input: Value) -> Result<Value, ActivityFailure> {
        let partials: Vec<PartialCount> = serde_json::from_value(input).map_err(|err| {
            ActivityFailure::permanent(StepError::ReduceFailed {
                reason: err.to_string(),
            })
        })?;

        let table = reduce::merge_partials(partials);
        encode(REDUCE_STEP, &table)
    }
}

/// The activity set of the word-frequency orchestration.
pub fn word_frequency_registry(
    fetcher: Arc<dyn DocumentFetcher>,
    config: AnalysisConfig,
) -> ActivityRegistry {
    let mut registry = ActivityRegistry::new();
    registry.register(GATHER_STEP, Arc::new(GatherActivity::new(fetcher, config)));
    registry.register(MAP_STEP, Arc::new(MapActivity::new(config)));
    registry.register(REDUCE_STEP, Arc::new(ReduceActivity));
    registry
}
