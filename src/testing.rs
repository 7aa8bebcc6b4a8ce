//! Shared fixtures for unit tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::ServerEnvironment;
use crate::domain::{resources::ResourceRegistry, tools::ToolRegistry};
use crate::errors::HandlerError;
use crate::news_client::{NewsPage, NewsSource};
use crate::AppState;

/// Serves one canned page and remembers which categories were requested.
#[derive(Clone, Default)]
pub struct RecordingNewsSource {
    body: String,
    requested: Arc<Mutex<Vec<String>>>,
}

impl RecordingNewsSource {
    pub fn with_body(body: &str) -> Self {
        Self {
            body: body.to_string(),
            requested: Arc::default(),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().expect("requested lock").clone()
    }
}

#[async_trait]
impl NewsSource for RecordingNewsSource {
    async fn fetch_category(&self, category: &str) -> Result<NewsPage, HandlerError> {
        self.requested
            .lock()
            .expect("requested lock")
            .push(category.to_string());
        Ok(NewsPage {
            status: 200,
            body: self.body.clone(),
        })
    }
}

pub struct FailingNewsSource(pub String);

#[async_trait]
impl NewsSource for FailingNewsSource {
    async fn fetch_category(&self, _category: &str) -> Result<NewsPage, HandlerError> {
        Err(HandlerError::Unavailable(self.0.clone()))
    }
}

pub fn test_environment() -> ServerEnvironment {
    ServerEnvironment {
        bind_addr: "0.0.0.0".to_string(),
        port: 8000,
        telemetry_configured: false,
        managed_identity_configured: false,
    }
}

pub fn state_with_news(source: impl NewsSource + 'static) -> AppState {
    AppState::new(test_environment(), Arc::new(source)).expect("builtin registries")
}

pub fn test_state() -> AppState {
    state_with_news(RecordingNewsSource::with_body(
        r#"<article class="post"><h2 class="post-block__title">Test headline about a new AI startup</h2></article>"#,
    ))
}

pub fn failing_state(message: &str) -> AppState {
    state_with_news(FailingNewsSource(message.to_string()))
}

pub fn state_with_resources(resources: ResourceRegistry) -> AppState {
    AppState::with_registries(
        ToolRegistry::builtin().expect("builtin tools"),
        resources,
        test_environment(),
        Arc::new(RecordingNewsSource::default()),
    )
}
