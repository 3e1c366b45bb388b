//! Gathering documents into a flat work list

use super::bucket::bucketize;
use super::types::{DocumentSet, WorkItem};
use crate::fetch::{DocumentFetcher, FetchError};
use thiserror::Error;
use tracing::{debug, info};

/// A fetch failure naming the document that aborted the gather
#[derive(Debug, Error)]
#[error("fetch failed for document '{document}': {source}")]
pub struct FetchFailed {
    pub document: String,
    #[source]
    pub source: FetchError,
}

/// Fetch every document in set order, bucketize it, and concatenate the
/// buckets in document order then bucket order. Any single fetch failure
/// aborts the whole gather; partial work lists are never returned. Two
/// calls with the same set and sources produce the same sequence.
pub async fn gather(
    documents: &DocumentSet,
    fetcher: &dyn DocumentFetcher,
    bucket_size: usize,
) -> Result<Vec<WorkItem>, FetchFailed> {
    let mut work_items = Vec::new();

    for doc in documents.iter() {
        let text = fetcher.fetch(&doc.uri).await.map_err(|source| FetchFailed {
            document: doc.name.clone(),
            source,
        })?;
        let buckets = bucketize(&text, &doc.name, bucket_size);
        debug!(document = %doc.name, buckets = buckets.len(), "bucketized document");
        work_items.extend(buckets);
    }

    info!(
        documents = documents.len(),
        work_items = work_items.len(),
        "gather complete"
    );
    Ok(work_items)
}
