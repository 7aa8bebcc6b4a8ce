use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod mcp;
pub mod news_client;
#[cfg(test)]
pub(crate) mod testing;

use config::ServerEnvironment;
use domain::{resources::ResourceRegistry, tools::ToolRegistry};
use errors::RegistryError;
use news_client::NewsSource;

#[derive(Clone)]
pub struct AppState {
    pub tools: Arc<ToolRegistry>,
    pub resources: Arc<ResourceRegistry>,
    pub news_source: Arc<dyn NewsSource>,
    pub environment: Arc<ServerEnvironment>,
}

impl AppState {
    pub fn new(
        environment: ServerEnvironment,
        news_source: Arc<dyn NewsSource>,
    ) -> Result<Self, RegistryError> {
        Ok(Self::with_registries(
            ToolRegistry::builtin()?,
            ResourceRegistry::builtin()?,
            environment,
            news_source,
        ))
    }

    pub fn with_registries(
        tools: ToolRegistry,
        resources: ResourceRegistry,
        environment: ServerEnvironment,
        news_source: Arc<dyn NewsSource>,
    ) -> Self {
        Self {
            tools: Arc::new(tools),
            resources: Arc::new(resources),
            news_source,
            environment: Arc::new(environment),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(http::handlers::health))
        .route("/health", get(http::handlers::health))
        .route("/.well-known/mcp", get(http::handlers::discovery))
        .route(http::handlers::MCP_ENDPOINT, post(http::handlers::mcp_endpoint))
        .layer(CatchPanicLayer::custom(http::handlers::panic_response))
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
