//! Durable workflow execution for the word-frequency pipeline
//!
//! The coordinator (`coordinator`) is a deterministic orchestration
//! function; the engine (`engine`) executes it against an append-only
//! history log (`history`) so a resumed run replays completed steps
//! instead of recomputing them. Side effects live in activities
//! (`activity`, `steps`), which the engine retries on transient failure.
//!
//! # Stage state machine
//!
//! ```text
//! GATHERING ──> MAPPING ──> REDUCING ──> COMPLETE
//!     │            │            │
//!     └────────────┴────────────┴──────> FAILED
//! ```
//!
//! The fan-out join in MAPPING is all-or-nothing: every map step must
//! complete before REDUCING starts, and a single unrecovered failure fails
//! the whole run. Partial results are never surfaced.

pub mod activity;
pub mod context;
pub mod coordinator;
pub mod engine;
pub mod errors;
pub mod history;
pub mod host;
pub mod run;
pub mod steps;

pub use activity::{Activity, ActivityFailure, ActivityRegistry, RetryPolicy};
pub use context::OrchestrationContext;
pub use coordinator::WORD_FREQUENCY;
pub use engine::WorkflowEngine;
pub use errors::{StepError, WorkflowError};
pub use history::{HistoryEvent, HistoryStore, InMemoryHistoryStore, JsonHistoryStore};
pub use host::WorkflowHost;
pub use run::{RunFailure, RunRegistry, RunStage, WorkflowRun};
pub use steps::word_frequency_registry;
