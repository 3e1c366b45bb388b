//! Shared fixtures for integration tests

use lexiflow::config::AnalysisConfig;
use lexiflow::fetch::InMemoryFetcher;
use lexiflow::workflow::{
    word_frequency_registry, HistoryStore, RetryPolicy, RunRegistry, WorkflowEngine, WorkflowHost,
    WorkflowRun,
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// A host over the in-memory fetcher with no retry delays.
pub fn host_with(
    fetcher: Arc<InMemoryFetcher>,
    bucket_size: usize,
    store: Arc<dyn HistoryStore>,
) -> Arc<WorkflowHost> {
    let config = AnalysisConfig {
        bucket_size,
        ..AnalysisConfig::default()
    };
    let registry = word_frequency_registry(fetcher, config);
    let engine = WorkflowEngine::new(registry, store, RunRegistry::new(), RetryPolicy::none());
    Arc::new(WorkflowHost::new(Arc::new(engine)))
}

/// Poll the run registry until the run reaches a terminal stage.
pub async fn wait_terminal(host: &WorkflowHost, instance_id: Uuid) -> WorkflowRun {
    for _ in 0..500 {
        if let Some(run) = host.status(instance_id).await {
            if run.stage.is_terminal() {
                return run;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("run {instance_id} did not reach a terminal stage");
}
