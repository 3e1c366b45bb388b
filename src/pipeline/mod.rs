//! Pure pipeline core: bucketizing, counting, merging, gathering
//!
//! Everything here is deterministic over its inputs. The only I/O is the
//! gather step's use of the fetch seam; bucketize, count and merge are pure
//! functions the workflow activities wrap.

pub mod bucket;
pub mod gather;
pub mod reduce;
pub mod tokenize;
pub mod types;

pub use types::{DocumentSet, DocumentSource, FrequencyTable, PartialCount, Provenance, TextBucket, WordEntry, WorkItem};
