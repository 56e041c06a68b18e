//! Object Store
//!
//! Durable JSON snapshots for cold-start recovery. Keys:
//! `snapshots/<datasetId>/v<N>.json` plus a best-effort `latest.json`
//! pointer that is overwritten, never deleted. Per-version snapshots are
//! retained up to a bounded count.

pub mod errors;
pub mod local;
pub mod snapshot;
pub mod store;

pub use errors::{ObjectError, ObjectResult};
pub use local::LocalObjectStore;
pub use snapshot::{SnapshotDocument, SnapshotStore, SnapshotValidation};
pub use store::{ObjectMetadata, ObjectStore, StoredObject};
