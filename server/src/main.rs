use std::sync::Arc;

use tokio::net::TcpListener;
use todo_server::{config::ServerConfig, observability, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    observability::init_tracing(config.log_format);

    if config.tokens.is_empty() {
        tracing::warn!("AUTH_TOKENS is empty; only public routes are reachable");
    }

    let state = AppState::in_memory(Arc::new(config.tokens.clone()));
    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    todo_server::run(listener, state).await?;
    Ok(())
}
