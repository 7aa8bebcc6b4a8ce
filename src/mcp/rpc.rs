//! JSON-RPC envelope decoding and encoding
//!
//! Requests are decoded permissively: only the presence of a string `method`
//! is enforced here, `params` are validated by the operation that consumes them.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::errors::RpcError;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcRequest {
    pub id: Value,
    pub method: String,
    pub params: Option<Value>,
    notification: bool,
}

impl JsonRpcRequest {
    pub fn new(id: Value, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            id,
            method: method.into(),
            params,
            notification: false,
        }
    }

    /// True when the envelope carried no `id` member at all.
    pub fn is_notification(&self) -> bool {
        self.notification
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("request body is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid request envelope: {reason}")]
    InvalidRequest { id: Value, reason: &'static str },
}

impl DecodeError {
    pub fn id(&self) -> Value {
        match self {
            Self::Parse(_) => Value::Null,
            Self::InvalidRequest { id, .. } => id.clone(),
        }
    }
}

impl From<DecodeError> for RpcError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Parse(_) => RpcError::Parse,
            DecodeError::InvalidRequest { reason, .. } => RpcError::invalid_request(reason),
        }
    }
}

pub fn decode_request(body: &[u8]) -> Result<JsonRpcRequest, DecodeError> {
    let payload: Value = serde_json::from_slice(body)?;

    let Value::Object(mut envelope) = payload else {
        return Err(DecodeError::InvalidRequest {
            id: Value::Null,
            reason: "expected a JSON object",
        });
    };

    let notification = !envelope.contains_key("id");
    let id = envelope
        .remove("id")
        .filter(|id| id.is_string() || id.is_number())
        .unwrap_or(Value::Null);

    let method = match envelope.remove("method") {
        Some(Value::String(method)) => method,
        Some(_) => {
            return Err(DecodeError::InvalidRequest {
                id,
                reason: "method must be a string",
            })
        }
        None => {
            return Err(DecodeError::InvalidRequest {
                id,
                reason: "missing method",
            })
        }
    };

    Ok(JsonRpcRequest {
        id,
        method,
        params: envelope.remove("params"),
        notification,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(Value),
    Error(ErrorObject),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Result(result),
        }
    }

    pub fn failure(id: Value, err: &RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Error(ErrorObject {
                code: err.code(),
                message: err.to_string(),
            }),
        }
    }

    pub fn encode(id: Value, outcome: Result<Value, RpcError>) -> Self {
        match outcome {
            Ok(result) => Self::success(id, result),
            Err(err) => Self::failure(id, &err),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::errors::{INVALID_REQUEST, PARSE_ERROR};

    #[test]
    fn decodes_full_envelope() {
        let request = decode_request(
            br#"{"jsonrpc":"2.0","id":"1","method":"tools/call","params":{"name":"echo"}}"#,
        )
        .expect("valid envelope");

        assert_eq!(request.id, json!("1"));
        assert_eq!(request.method, "tools/call");
        assert_eq!(request.params, Some(json!({"name": "echo"})));
        assert!(!request.is_notification());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = decode_request(b"not json").expect_err("parse failure");
        assert!(matches!(err, DecodeError::Parse(_)));
        assert_eq!(err.id(), Value::Null);
        assert_eq!(RpcError::from(err).code(), PARSE_ERROR);
    }

    #[test]
    fn missing_method_keeps_id() {
        let err = decode_request(br#"{"jsonrpc":"2.0","id":7}"#).expect_err("invalid request");
        assert_eq!(err.id(), json!(7));
        assert_eq!(RpcError::from(err).code(), INVALID_REQUEST);
    }

    #[test]
    fn non_scalar_id_is_dropped() {
        let err = decode_request(br#"{"id":{"nested":true}}"#).expect_err("invalid request");
        assert_eq!(err.id(), Value::Null);
    }

    #[test]
    fn non_object_payload_is_invalid_request() {
        let err = decode_request(b"[1,2,3]").expect_err("invalid request");
        assert!(matches!(err, DecodeError::InvalidRequest { .. }));
    }

    #[test]
    fn non_string_method_is_invalid_request() {
        let err = decode_request(br#"{"id":1,"method":42}"#).expect_err("invalid request");
        assert_eq!(err.id(), json!(1));
        assert!(matches!(err, DecodeError::InvalidRequest { .. }));
    }

    #[test]
    fn missing_id_marks_notification() {
        let request = decode_request(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .expect("valid envelope");
        assert!(request.is_notification());
        assert_eq!(request.id, Value::Null);

        let request =
            decode_request(br#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).expect("valid");
        assert!(!request.is_notification());
    }

    #[test]
    fn wrong_typed_params_pass_through() {
        let request =
            decode_request(br#"{"id":1,"method":"tools/call","params":[1]}"#).expect("valid");
        assert_eq!(request.params, Some(json!([1])));
    }

    #[test]
    fn encoded_error_exposes_only_code_and_message() {
        let response =
            JsonRpcResponse::failure(json!("abc"), &RpcError::method_not_found("nope"));
        let encoded = serde_json::to_value(&response).expect("serialize response");

        assert_eq!(encoded["jsonrpc"], "2.0");
        assert_eq!(encoded["id"], "abc");
        assert!(encoded.get("result").is_none());

        let error = encoded["error"].as_object().expect("error object");
        let mut keys = error.keys().cloned().collect::<Vec<_>>();
        keys.sort();
        assert_eq!(keys, vec!["code".to_string(), "message".to_string()]);
        assert_eq!(error["code"], -32601);
        assert_eq!(error["message"], "Method not found: nope");
    }

    #[test]
    fn encoded_success_has_no_error() {
        let response = JsonRpcResponse::encode(json!(2), Ok(json!({"tools": []})));
        let encoded = serde_json::to_value(&response).expect("serialize response");

        assert!(!response.is_error());
        assert_eq!(encoded["result"]["tools"], json!([]));
        assert!(encoded.get("error").is_none());
    }
}
