//! HTTP Server
//!
//! The thin axum surface over the pipeline: dataset reads, the
//! ingest-reporting endpoint, admin registration, readiness control, and
//! health/metrics.

pub mod admin_routes;
pub mod config;
pub mod dataset_routes;
pub mod ingest_routes;
pub mod observability_routes;
pub mod server;
pub mod state;

pub use config::HttpServerConfig;
pub use server::HttpServer;
pub use state::AppState;
