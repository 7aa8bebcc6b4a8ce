//! Axum HTTP handlers for the web server
//!
//! Provides the Model Context Protocol endpoint and the liveness and discovery endpoints.

use std::any::Any;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::errors::{panic_message, RpcError};
use crate::logging::RpcMethod;
use crate::mcp::rpc::{decode_request, DecodeError, JsonRpcResponse};
use crate::mcp::server::{handle_json_rpc_request, SUPPORTED_PROTOCOL_VERSION};
use crate::AppState;

pub const SERVICE_NAME: &str = "MCP Demo Server";
pub const MCP_ENDPOINT: &str = "/mcp";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub protocol: &'static str,
    pub protocol_version: &'static str,
    pub transport: &'static str,
    pub mcp_endpoint: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub mcp_endpoint: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        protocol: "MCP",
        protocol_version: SUPPORTED_PROTOCOL_VERSION,
        transport: "streamable-http",
        mcp_endpoint: MCP_ENDPOINT,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

pub async fn discovery() -> Json<DiscoveryResponse> {
    Json(DiscoveryResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        mcp_endpoint: MCP_ENDPOINT,
    })
}

pub async fn mcp_endpoint(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match decode_request(&body) {
        Ok(request) => request,
        Err(err @ DecodeError::Parse(_)) => {
            warn!(error = %err, "rejecting unparseable request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::failure(Value::Null, &RpcError::Parse)),
            )
                .into_response();
        }
        Err(err) => {
            warn!(error = %err, "rejecting malformed request envelope");
            let id = err.id();
            return (
                StatusCode::OK,
                Json(JsonRpcResponse::failure(id, &RpcError::from(err))),
            )
                .into_response();
        }
    };

    let rpc_method = RpcMethod(request.method.clone());
    let mut response = if request.is_notification() && request.method.starts_with("notifications/") {
        debug!(method = %request.method, "notification acknowledged");
        StatusCode::ACCEPTED.into_response()
    } else {
        let response = handle_json_rpc_request(&state, request).await;
        (StatusCode::OK, Json(response)).into_response()
    };

    response.extensions_mut().insert(rpc_method);
    response
}

/// Answers a panic that escaped the dispatcher. The request id is unrecoverable here, so it is null.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic_message(panic.as_ref());
    error!(panic = %detail, "request escaped the dispatcher with a panic");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(JsonRpcResponse::failure(
            Value::Null,
            &RpcError::internal("Internal error"),
        )),
    )
        .into_response()
}
