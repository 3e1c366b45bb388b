//! Document fetch transport
//!
//! The gather step only sees the [`DocumentFetcher`] trait; the HTTP
//! implementation and the in-memory fixture live behind it so the pipeline
//! can be exercised without a network.

mod http;
mod memory;

pub use http::HttpFetcher;
pub use memory::InMemoryFetcher;

use async_trait::async_trait;
use thiserror::Error;

/// Failure of a single document fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status} fetching {uri}")]
    Status { uri: String, status: u16 },

    #[error("no document at {0}")]
    NotFound(String),
}

/// Resolves a source URI to document text.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<String, FetchError>;
}
