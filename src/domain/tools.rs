//! Interactive tools exposed via Model Context Protocol
//!
//! The registry is built once at startup and shared read-only between requests.
//! Handlers narrow their own arguments and never reject a call for a malformed
//! optional field.

use std::{collections::HashMap, panic::AssertUnwindSafe, sync::Arc};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use futures_util::FutureExt;
use rust_mcp_sdk::schema::{CallToolResult, ContentBlock, TextContent};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{error, warn};

use crate::domain::news::{normalize_category, summarize_page, CATEGORIES, DEFAULT_CATEGORY};
use crate::domain::utils::{Arguments, Payload};
use crate::errors::{panic_message, HandlerError, RegistryError, RpcError};
use crate::mcp::server::SUPPORTED_PROTOCOL_VERSION;
use crate::AppState;

pub const ECHO_TOOL: &str = "echo";
pub const SERVER_INFO_TOOL: &str = "get_server_info";
pub const TECHCRUNCH_TOOL: &str = "fetch_from_techcrunch";

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, state: &AppState, arguments: &Arguments)
        -> Result<Payload, HandlerError>;
}

#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    pub fn new(
        name: &'static str,
        description: &'static str,
        input_schema: Value,
        handler: impl ToolHandler + 'static,
    ) -> Self {
        Self {
            name,
            description,
            input_schema,
            handler: Arc::new(handler),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSummary<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub input_schema: &'a Value,
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        registry.register(ToolDescriptor::new(
            ECHO_TOOL,
            "Echo a message back to the caller, optionally upper-cased",
            json!({
                "type": "object",
                "properties": {
                    "message": {"type": "string", "description": "Text to echo back"},
                    "uppercase": {"type": "boolean", "description": "Upper-case the message", "default": false}
                },
                "required": ["message"]
            }),
            EchoTool,
        ))?;
        registry.register(ToolDescriptor::new(
            SERVER_INFO_TOOL,
            "Describe this server, optionally including its hosting environment",
            json!({
                "type": "object",
                "properties": {
                    "includeEnvironment": {"type": "boolean", "description": "Include hosting environment details", "default": false}
                }
            }),
            ServerInfoTool,
        ))?;
        registry.register(ToolDescriptor::new(
            TECHCRUNCH_TOOL,
            "Fetch the latest news from TechCrunch for a given category",
            json!({
                "type": "object",
                "properties": {
                    "category": {"type": "string", "enum": CATEGORIES, "default": DEFAULT_CATEGORY}
                }
            }),
            TechCrunchTool,
        ))?;
        Ok(registry)
    }

    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<(), RegistryError> {
        if self.index.contains_key(descriptor.name) {
            return Err(RegistryError::DuplicateTool(descriptor.name.to_string()));
        }

        self.index.insert(descriptor.name, self.tools.len());
        self.tools.push(descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|position| &self.tools[*position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

pub fn build_tools_list(registry: &ToolRegistry) -> Value {
    let tools = registry
        .iter()
        .map(|tool| ToolSummary {
            name: tool.name,
            description: tool.description,
            input_schema: &tool.input_schema,
        })
        .collect::<Vec<_>>();

    json!({ "tools": tools })
}

pub async fn handle_tools_call(state: &AppState, params: Option<&Value>) -> Result<Value, RpcError> {
    let params = params.and_then(Value::as_object);

    let name = params
        .and_then(|params| params.get("name"))
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::invalid_params("Missing tool name"))?;

    let arguments = match params.and_then(|params| params.get("arguments")) {
        None | Some(Value::Null) => Arguments::default(),
        Some(Value::Object(map)) => Arguments::new(map.clone()),
        Some(_) => return Err(RpcError::invalid_params("Tool arguments must be an object")),
    };

    let tool = state
        .tools
        .get(name)
        .ok_or_else(|| RpcError::unknown_tool(name))?;

    let payload = AssertUnwindSafe(tool.handler.call(state, &arguments))
        .catch_unwind()
        .await
        .unwrap_or_else(|caught| Err(HandlerError::Panicked(panic_message(caught.as_ref()))))
        .map_err(|err| {
            error!(tool = name, error = %err, "tool handler failed");
            RpcError::from(err)
        })?;

    let structured_content = payload.structured();
    let text = payload.into_text().map_err(RpcError::from)?;

    serde_json::to_value(CallToolResult {
        content: vec![ContentBlock::from(TextContent::new(text, None, None))],
        is_error: None,
        meta: None,
        structured_content,
    })
    .map_err(|err| RpcError::internal(err.to_string()))
}

pub struct EchoTool;

#[async_trait]
impl ToolHandler for EchoTool {
    async fn call(
        &self,
        _state: &AppState,
        arguments: &Arguments,
    ) -> Result<Payload, HandlerError> {
        let message = arguments.str_or("message", "");
        let message = if arguments.flag_or("uppercase", false) {
            message.to_uppercase()
        } else {
            message.to_string()
        };

        Ok(Payload::Text(format!("Echo: {message}")))
    }
}

pub struct ServerInfoTool;

#[async_trait]
impl ToolHandler for ServerInfoTool {
    async fn call(&self, state: &AppState, arguments: &Arguments) -> Result<Payload, HandlerError> {
        let mut info = Map::from_iter([
            ("name".to_string(), json!(env!("CARGO_PKG_NAME"))),
            ("version".to_string(), json!(env!("CARGO_PKG_VERSION"))),
            ("protocolVersion".to_string(), json!(SUPPORTED_PROTOCOL_VERSION)),
            (
                "timestamp".to_string(),
                json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            ),
            (
                "runtime".to_string(),
                json!({
                    "os": std::env::consts::OS,
                    "arch": std::env::consts::ARCH,
                }),
            ),
        ]);

        if arguments.flag_or("includeEnvironment", false) {
            let environment = &state.environment;
            info.insert(
                "environment".to_string(),
                json!({
                    "bindAddr": environment.bind_addr,
                    "port": environment.port,
                    "telemetryConfigured": environment.telemetry_configured,
                    "managedIdentityConfigured": environment.managed_identity_configured,
                }),
            );
        }

        Ok(Payload::Json(Value::Object(info)))
    }
}

pub struct TechCrunchTool;

#[async_trait]
impl ToolHandler for TechCrunchTool {
    async fn call(&self, state: &AppState, arguments: &Arguments) -> Result<Payload, HandlerError> {
        let requested = arguments.str_or("category", DEFAULT_CATEGORY);
        let category = normalize_category(requested).unwrap_or_else(|| {
            warn!(category = requested, "invalid news category, defaulting to latest");
            DEFAULT_CATEGORY
        });

        let page = state.news_source.fetch_category(category).await?;
        Ok(Payload::Text(summarize_page(category, &page)))
    }
}
