use std::any::Any;

use thiserror::Error;

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// Protocol-level failure reported back to the caller as a JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("Parse error")]
    Parse,
    #[error("Invalid Request: {0}")]
    InvalidRequest(String),
    #[error("{0}")]
    MethodNotFound(String),
    #[error("{0}")]
    InvalidParams(String),
    #[error("{0}")]
    Internal(String),
}

impl RpcError {
    pub fn code(&self) -> i64 {
        match self {
            Self::Parse => PARSE_ERROR,
            Self::InvalidRequest(_) => INVALID_REQUEST,
            Self::MethodNotFound(_) => METHOD_NOT_FOUND,
            Self::InvalidParams(_) => INVALID_PARAMS,
            Self::Internal(_) => INTERNAL_ERROR,
        }
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest(reason.into())
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::MethodNotFound(format!("Method not found: {method}"))
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::MethodNotFound(format!("Unknown tool: {name}"))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    // Unknown resources reuse -32602 rather than -32601; clients depend on it.
    pub fn resource_not_found(uri: &str) -> Self {
        Self::InvalidParams(format!("Resource not found: {uri}"))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

/// Failure raised inside a tool handler or resource producer.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Request timeout while fetching {0}")]
    Timeout(String),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Panicked(String),
}

impl From<HandlerError> for RpcError {
    fn from(err: HandlerError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Best-effort text of a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool `{0}` is registered more than once")]
    DuplicateTool(String),
    #[error("resource `{0}` is registered more than once")]
    DuplicateResource(String),
}
