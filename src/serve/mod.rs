//! HTTP / Cache Mapper
//!
//! Turns persisted truth (validation, lifecycle, schema info) into the
//! wire triple: status code, `Cache-Control`, and the renderability
//! contract. Only `live` + `valid` is ever cache-eligible; everything
//! else is `no-store` so downstream caches cannot be poisoned.

pub mod mapper;
pub mod renderability;
pub mod response;

pub use mapper::{map_wire, WireDirective};
pub use renderability::{derive_renderability, Renderability};
pub use response::{ApiError, ApiResponse, CacheMeta, QuotaMeta, ResponseMeta, ResponseStatus};
