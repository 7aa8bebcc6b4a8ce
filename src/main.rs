use std::sync::Arc;

use mcp_demo_server::{
    build_app, config::Config, logging, news_client::HttpNewsClient, AppState,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::from_env()?;
    let news_source = Arc::new(HttpNewsClient::new(config.news_base_url.clone())?);
    let bind_socket = config.bind_socket()?;
    let environment = config.environment();
    let state = AppState::new(environment.clone(), news_source)?;
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %environment.bind_addr,
        port = environment.port,
        telemetry_configured = environment.telemetry_configured,
        managed_identity_configured = environment.managed_identity_configured,
        "server starting"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
