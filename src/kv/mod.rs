//! KV Surface
//!
//! The opaque key/value store the site's edge reads from. Treated as an
//! eventually consistent, non-authoritative mirror of the commit log.
//! Two keys per dataset: the versioned envelope blob and a small pointer
//! string. Pointer writes are last-writer-wins string puts; no
//! compare-and-set is assumed.

pub mod errors;
pub mod keys;
pub mod memory;
pub mod surface;

pub use errors::{KvError, KvResult};
pub use keys::{dataset_prefix, parse_pointer, pointer_key, pointer_value, versioned_key};
pub use memory::MemoryKv;
pub use surface::KvSurface;
