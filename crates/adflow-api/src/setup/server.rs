//! HTTP server startup.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;

use adflow_core::Config;

pub async fn start_server(config: &Config, router: Router) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(addr = %addr, "Adflow API listening");
    axum::serve(listener, router)
        .await
        .context("Server error")?;
    Ok(())
}
