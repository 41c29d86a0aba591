mod auth;
mod constants;
mod error;
mod handlers;
mod services;
mod setup;
mod state;

use tracing_subscriber::EnvFilter;

use adflow_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    // The dispatcher handle keeps the outbox loop alive; dropping it would
    // shut the loop down.
    let (_state, router, _dispatcher) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, router).await?;
    Ok(())
}
