//! # Lexiflow
//!
//! Durable word-frequency analysis over a set of remote text documents,
//! organized as a gather → map → reduce pipeline driven by a replay-safe
//! workflow engine.
//!
//! ## Modules
//!
//! - `api` - HTTP entry point for starting and polling workflow runs
//! - `config` - Analysis configuration and the static stopword set
//! - `fetch` - Document fetch transport behind a trait seam
//! - `pipeline` - Pure pipeline core: bucketizing, counting, merging
//! - `workflow` - Coordinator, execution engine, history log, run registry
pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod workflow;

pub use error::{Error, Result};
