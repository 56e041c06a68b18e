//! Commit Log
//!
//! Durable, queryable history of every ingestion attempt and the single
//! authoritative pointer to the currently-served version per dataset.
//! Promotion pairs the supersede/commit row transition with the pointer
//! upsert in one atomic unit; readers observe the old committed version
//! or the new one, never a partial state.

pub mod errors;
pub mod pointer;
pub mod record;
pub mod store;

pub use errors::{CommitLogError, CommitLogResult};
pub use pointer::CurrentVersion;
pub use record::{CommitRecord, CommitStatus};
pub use store::CommitLog;
