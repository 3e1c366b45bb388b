//! End-to-end workflow runs over the in-memory fetcher

mod common;

use common::{host_with, wait_terminal};
use lexiflow::fetch::InMemoryFetcher;
use lexiflow::pipeline::DocumentSet;
use lexiflow::workflow::{InMemoryHistoryStore, RunStage, StepError, WorkflowError};
use std::sync::Arc;

fn documents(entries: &[(&str, &str)]) -> DocumentSet {
    entries
        .iter()
        .map(|(name, uri)| (name.to_string(), uri.to_string()))
        .collect()
}

#[tokio::test]
async fn quick_brown_fox_scenario() {
    let text = "The quick brown fox jumps over the lazy dog fox fox";
    let fetcher = Arc::new(InMemoryFetcher::new().with_document("mem://a", text));
    let host = host_with(fetcher, 5, Arc::new(InMemoryHistoryStore::new()));

    let id = host
        .start(documents(&[("a", "mem://a")]))
        .await
        .unwrap();
    let run = wait_terminal(&host, id).await;

    assert_eq!(run.stage, RunStage::Complete);
    // eleven words at bucket size 5 fan out as three buckets
    assert_eq!(run.work_items, Some(3));

    let table = run.output.expect("completed run holds the table");
    assert_eq!(table.len(), 6);
    assert_eq!(table["fox"].count, 3);
    for word in ["quick", "brown", "jumps", "lazy", "dog"] {
        assert_eq!(table[word].count, 1, "count for {word}");
    }
    // stopwords never reach the table
    assert!(!table.contains_key("the"));
    assert!(!table.contains_key("over"));

    // one provenance entry per contributing bucket, in submission order
    let origins: Vec<(u64, u64)> = table["fox"]
        .provenance
        .iter()
        .map(|p| (p.bucket_id, p.count))
        .collect();
    assert_eq!(origins, [(0, 1), (1, 1), (2, 1)]);
    for origin in &table["fox"].provenance {
        assert_eq!(origin.document_name, "a");
    }
}

#[tokio::test]
async fn counts_aggregate_across_documents() {
    let fetcher = Arc::new(
        InMemoryFetcher::new()
            .with_document("mem://a", "fox fox quick")
            .with_document("mem://b", "fox lazy lazy"),
    );
    let host = host_with(fetcher, 2, Arc::new(InMemoryHistoryStore::new()));

    let table = host
        .run_to_completion(documents(&[("a", "mem://a"), ("b", "mem://b")]))
        .await
        .unwrap();

    assert_eq!(table["fox"].count, 3);
    assert_eq!(table["lazy"].count, 2);
    let fox_documents: Vec<&str> = table["fox"]
        .provenance
        .iter()
        .map(|p| p.document_name.as_str())
        .collect();
    assert_eq!(fox_documents, ["a", "a", "b"]);
}

#[tokio::test]
async fn empty_document_set_completes_with_empty_table() {
    let fetcher = Arc::new(InMemoryFetcher::new());
    let host = host_with(fetcher, 5, Arc::new(InMemoryHistoryStore::new()));

    let id = host.start(DocumentSet::default()).await.unwrap();
    let run = wait_terminal(&host, id).await;

    assert_eq!(run.stage, RunStage::Complete);
    assert_eq!(run.work_items, Some(0));
    assert!(run.output.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_document_fails_the_run() {
    let fetcher = Arc::new(InMemoryFetcher::new().with_document("mem://a", "hello world"));
    let host = host_with(fetcher, 5, Arc::new(InMemoryHistoryStore::new()));

    let id = host
        .start(documents(&[("a", "mem://a"), ("missing", "mem://missing")]))
        .await
        .unwrap();
    let run = wait_terminal(&host, id).await;

    assert_eq!(run.stage, RunStage::Failed);
    assert!(run.output.is_none(), "failed runs produce no table");

    let failure = run.failure.expect("failed run holds a failure record");
    assert_eq!(failure.stage, RunStage::Gathering);
    assert!(
        matches!(failure.error, StepError::FetchFailed { ref document, .. } if document == "missing")
    );
}

#[tokio::test]
async fn run_to_completion_surfaces_fetch_failures() {
    let fetcher = Arc::new(InMemoryFetcher::new());
    let host = host_with(fetcher, 5, Arc::new(InMemoryHistoryStore::new()));

    let error = host
        .run_to_completion(documents(&[("ghost", "mem://ghost")]))
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        WorkflowError::Step(StepError::FetchFailed { ref document, .. }) if document == "ghost"
    ));
}
