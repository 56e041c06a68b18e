//! HTTP server assembly
//!
//! Combines all endpoint routers over one shared pipeline state.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::pipeline::Pipeline;

use super::admin_routes::admin_routes;
use super::config::HttpServerConfig;
use super::dataset_routes::dataset_routes;
use super::ingest_routes::ingest_routes;
use super::observability_routes::{health_routes, observability_routes};
use super::state::AppState;

/// HTTP server for the pipeline
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server over a wired pipeline
    pub fn new(pipeline: Pipeline, config: HttpServerConfig) -> Self {
        let state = Arc::new(AppState::new(pipeline, &config));
        let router = Self::build_router(state, &config);
        Self { config, router }
    }

    fn build_router(state: Arc<AppState>, config: &HttpServerConfig) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            use tower_http::cors::AllowOrigin;
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .merge(dataset_routes(state.clone()))
            .merge(ingest_routes(state.clone()))
            .merge(admin_routes(state.clone()))
            .merge(observability_routes(state))
            .layer(cors)
    }

    /// Bind and serve until the process exits.
    pub async fn serve(self) -> Result<(), String> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("failed to bind {}: {}", addr, e))?;

        axum::serve(listener, self.router)
            .await
            .map_err(|e| format!("server error: {}", e))
    }

    /// The assembled router (test surface)
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
