mod analytics;
mod auth;
mod config;
mod docs;
mod english_learning;
mod error;
mod info;
mod media;
mod middlewares;
mod oauth;
mod platform_accounts;
mod posts;
mod router;
mod state;
mod telegram;

use std::sync::Arc;

use dotenvy::dotenv;
use router::router;

use crate::{config::ServerConfig, state::ServerState};

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env()?;
    let db = sled::open(&config.sled_url)?;
    let state = Arc::new(ServerState::new(config.clone(), &db)?);

    match state.oauth_states().cleanup_expired() {
        Ok(0) => {}
        Ok(removed) => log::info!("Removed {} expired OAuth states", removed),
        Err(e) => log::warn!("Failed to clean OAuth states: {}", e),
    }

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server_domain).await?;
    log::info!("Listening on {}", config.server_domain);

    axum::serve(listener, app).await?;
    Ok(())
}
