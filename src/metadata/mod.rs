//! Metadata Store
//!
//! The single point of truth for identities, schemas, commit history,
//! serving pointers, and readiness. The store is a trait seam: the
//! in-memory implementation here backs tests and single-process
//! deployments; a relational backend implements the same contract.
//!
//! Atomicity contract: `promote_commit` performs supersede + commit +
//! pointer upsert as one unit. `register_identity` decides tuple
//! ownership under the same lock that inserts.

pub mod errors;
pub mod memory;
pub mod store;

pub use errors::{MetadataError, MetadataResult};
pub use memory::MemoryMetadataStore;
pub use store::MetadataStore;
