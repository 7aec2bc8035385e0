// CPF Registry - Web Server
// REST API with Axum over an in-memory registry (starts empty every run)

use anyhow::{Context, Result};
use cpf_registry::config::AppConfig;
use cpf_registry::logging;
use cpf_registry::server::{router, AppState};
use cpf_registry::Registry;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_stderr(&config.logging);

    let state = AppState::new(Registry::new());
    let app = router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;

    tracing::info!(%addr, "server running");
    tracing::info!("API: http://{}/api/records", addr);

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
