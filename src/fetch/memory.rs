//! In-memory fetch fixture for tests and local runs

use super::{DocumentFetcher, FetchError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves documents from a URI → text map and counts the calls made, so
/// tests can assert that replayed steps never re-fetch.
#[derive(Default)]
pub struct InMemoryFetcher {
    documents: HashMap<String, String>,
    calls: AtomicUsize,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, uri: &str, text: &str) -> Self {
        self.documents.insert(uri.to_string(), text.to_string());
        self
    }

    /// Number of fetches performed since construction.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentFetcher for InMemoryFetcher {
    async fn fetch(&self, uri: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.documents
            .get(uri)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(uri.to_string()))
    }
}
