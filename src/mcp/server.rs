//! The central Model Context Protocol engine
//!
//! Routes a decoded request to one of the supported methods and turns the
//! outcome into a response envelope. Nothing raised by a tool or resource
//! crosses this boundary except as a JSON-RPC error.

use rust_mcp_sdk::schema::{
    Implementation, InitializeResult, ProtocolVersion, ServerCapabilities,
    ServerCapabilitiesResources, ServerCapabilitiesTools,
};
use serde_json::{json, Value};
use tracing::info;

use crate::domain::{
    resources::{build_resources_list, handle_resources_read},
    tools::{build_tools_list, handle_tools_call},
};
use crate::errors::RpcError;
use crate::mcp::rpc::{JsonRpcRequest, JsonRpcResponse};
use crate::AppState;

pub const SUPPORTED_PROTOCOL_VERSION: &str = "2024-11-05";

pub async fn handle_json_rpc_request(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let audit_params = redact_audit_params(request.params.as_ref());
    let outcome = dispatch(state, &request).await;
    let response = JsonRpcResponse::encode(request.id, outcome);

    info!(
        method = %request.method,
        params = %audit_params,
        outcome = if response.is_error() { "failure" } else { "success" },
        "mcp action audited"
    );

    response
}

pub async fn dispatch(state: &AppState, request: &JsonRpcRequest) -> Result<Value, RpcError> {
    let params = request.params.as_ref();

    match request.method.as_str() {
        "initialize" => initialize_result(),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(build_tools_list(&state.tools)),
        "tools/call" => handle_tools_call(state, params).await,
        "resources/list" => build_resources_list(&state.resources),
        "resources/read" => handle_resources_read(state, params).await,
        method => Err(RpcError::method_not_found(method)),
    }
}

pub fn initialize_result() -> Result<Value, RpcError> {
    let initialize_result = InitializeResult {
        server_info: Implementation {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: None,
            description: None,
            icons: vec![],
            website_url: None,
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools {
                list_changed: Some(true),
            }),
            resources: Some(ServerCapabilitiesResources {
                subscribe: Some(true),
                list_changed: Some(true),
            }),
            prompts: None,
            ..Default::default()
        },
        protocol_version: ProtocolVersion::V2024_11_05.into(),
        instructions: None,
        meta: None,
    };

    serde_json::to_value(initialize_result).map_err(|err| RpcError::internal(err.to_string()))
}

pub fn redact_audit_params(params: Option<&Value>) -> Value {
    params.map(redact_audit_value).unwrap_or(Value::Null)
}

pub fn redact_audit_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    if is_sensitive_key(key) {
                        (key.clone(), Value::String("[REDACTED]".to_string()))
                    } else {
                        (key.clone(), redact_audit_value(item))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_audit_value).collect()),
        _ => value.clone(),
    }
}

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_ascii_lowercase().replace(['-', '_'], "");
    ["token", "secret", "password", "credential", "apikey", "authorization", "connectionstring"]
        .iter()
        .any(|marker| normalized.contains(marker))
}
