use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// JSON-RPC method served by a `/mcp` request, attached to the response for the summary line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcMethod(pub String);

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started_at.elapsed().as_millis();
    let rpc_method = response
        .extensions()
        .get::<RpcMethod>()
        .map(|rpc_method| rpc_method.0.as_str())
        .unwrap_or("-");

    info!(
        method = %method,
        path = %path,
        rpc_method,
        status = status.as_u16(),
        duration_ms = elapsed_ms,
        "request summary"
    );

    if status.is_client_error() || status.is_server_error() {
        warn!(
            method = %method,
            path = %path,
            rpc_method,
            status = status.as_u16(),
            "request rejected"
        );
    }

    response
}
