//! Dataset Identity
//!
//! A dataset is addressed by the tuple
//! `(sport, competition_level, season, dataset_type, qualifier?)`.
//! The canonical, hash-derived `DatasetId` is the only identifier the rest
//! of the pipeline sees; the registry keeps the id ↔ tuple mapping and
//! guards against two ids claiming the same tuple.

pub mod errors;
pub mod registry;
pub mod tuple;

pub use errors::{IdentityError, IdentityResult};
pub use registry::{IdentityRegistry, IdentityRow};
pub use tuple::{DatasetId, DatasetIdentity, IDENTITY_SCHEMA_VERSION};
