//! Model Context Protocol static resource providers
//!
//! Exposes server metadata snapshots as JSON documents under fixed URIs.

use std::{collections::HashMap, panic};

use chrono::{SecondsFormat, Utc};
use rust_mcp_sdk::schema::{
    ListResourcesResult, ReadResourceContent, ReadResourceResult, Resource, TextResourceContents,
};
use serde_json::{json, Value};
use tracing::error;

use crate::domain::news::{CATEGORIES, DEFAULT_CATEGORY};
use crate::domain::utils::Payload;
use crate::errors::{panic_message, HandlerError, RegistryError, RpcError};
use crate::mcp::server::SUPPORTED_PROTOCOL_VERSION;
use crate::AppState;

pub const SERVER_INFO_RESOURCE_URI: &str = "server://info";
pub const SERVER_STATUS_RESOURCE_URI: &str = "server://status";
pub const NEWS_CATEGORIES_RESOURCE_URI: &str = "techcrunch://categories";

const JSON_MIME_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceContent {
    pub mime_type: &'static str,
    pub payload: Payload,
}

pub type ResourceProducer = fn() -> Result<ResourceContent, HandlerError>;

#[derive(Clone)]
pub struct ResourceDescriptor {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
    pub producer: ResourceProducer,
}

#[derive(Default)]
pub struct ResourceRegistry {
    resources: Vec<ResourceDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl ResourceRegistry {
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        registry.register(ResourceDescriptor {
            uri: SERVER_INFO_RESOURCE_URI,
            name: "Server Information",
            description: "Name, version and endpoints of this MCP server",
            mime_type: JSON_MIME_TYPE,
            producer: server_info,
        })?;
        registry.register(ResourceDescriptor {
            uri: SERVER_STATUS_RESOURCE_URI,
            name: "Server Status",
            description: "Liveness snapshot with the current server time",
            mime_type: JSON_MIME_TYPE,
            producer: server_status,
        })?;
        registry.register(ResourceDescriptor {
            uri: NEWS_CATEGORIES_RESOURCE_URI,
            name: "News Categories",
            description: "Categories accepted by the fetch_from_techcrunch tool",
            mime_type: JSON_MIME_TYPE,
            producer: news_categories,
        })?;
        Ok(registry)
    }

    pub fn register(&mut self, descriptor: ResourceDescriptor) -> Result<(), RegistryError> {
        if self.index.contains_key(descriptor.uri) {
            return Err(RegistryError::DuplicateResource(descriptor.uri.to_string()));
        }

        self.index.insert(descriptor.uri, self.resources.len());
        self.resources.push(descriptor);
        Ok(())
    }

    pub fn get(&self, uri: &str) -> Option<&ResourceDescriptor> {
        self.index.get(uri).map(|position| &self.resources[*position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.resources.iter()
    }
}

pub fn build_resources_list(registry: &ResourceRegistry) -> Result<Value, RpcError> {
    let resources = registry
        .iter()
        .map(|resource| Resource {
            annotations: None,
            description: Some(resource.description.to_string()),
            icons: vec![],
            meta: None,
            mime_type: Some(resource.mime_type.to_string()),
            name: resource.name.to_string(),
            size: None,
            title: None,
            uri: resource.uri.to_string(),
        })
        .collect();

    serde_json::to_value(ListResourcesResult {
        meta: None,
        next_cursor: None,
        resources,
    })
    .map_err(|err| RpcError::internal(err.to_string()))
}

pub async fn handle_resources_read(
    state: &AppState,
    params: Option<&Value>,
) -> Result<Value, RpcError> {
    let uri = params
        .and_then(Value::as_object)
        .and_then(|params| params.get("uri"))
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::invalid_params("Missing URI parameter"))?;

    let resource = state
        .resources
        .get(uri)
        .ok_or_else(|| RpcError::resource_not_found(uri))?;

    let content = panic::catch_unwind(resource.producer)
        .unwrap_or_else(|caught| Err(HandlerError::Panicked(panic_message(caught.as_ref()))))
        .map_err(|err| {
            error!(uri, error = %err, "resource producer failed");
            RpcError::from(err)
        })?;
    let text = content.payload.into_text()?;

    serde_json::to_value(ReadResourceResult {
        contents: vec![ReadResourceContent::from(TextResourceContents {
            meta: None,
            mime_type: Some(content.mime_type.to_string()),
            text,
            uri: resource.uri.to_string(),
        })],
        meta: None,
    })
    .map_err(|err| RpcError::internal(err.to_string()))
}

fn server_info() -> Result<ResourceContent, HandlerError> {
    Ok(ResourceContent {
        mime_type: JSON_MIME_TYPE,
        payload: Payload::Json(json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "protocolVersion": SUPPORTED_PROTOCOL_VERSION,
            "transport": "streamable-http",
            "endpoints": {
                "mcp": "/mcp",
                "health": "/health",
            },
        })),
    })
}

fn server_status() -> Result<ResourceContent, HandlerError> {
    Ok(ResourceContent {
        mime_type: JSON_MIME_TYPE,
        payload: Payload::Json(json!({
            "status": "healthy",
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })),
    })
}

fn news_categories() -> Result<ResourceContent, HandlerError> {
    Ok(ResourceContent {
        mime_type: JSON_MIME_TYPE,
        payload: Payload::Json(json!({
            "categories": CATEGORIES,
            "default": DEFAULT_CATEGORY,
        })),
    })
}
