//! Application initialization: database, state, dispatcher, and routes.

pub mod database;
pub mod routes;
pub mod server;

use std::sync::Arc;

use axum::Router;

use adflow_core::Config;
use adflow_worker::{DispatcherConfig, JobDispatcher};

use crate::state::AppState;

/// Initialize the application: connect the database, build the state, spawn
/// the job dispatcher, and assemble the router. The returned dispatcher
/// handle must stay alive for the lifetime of the process.
pub async fn initialize_app(
    config: Config,
) -> Result<(Arc<AppState>, Router, JobDispatcher), anyhow::Error> {
    let pool = database::setup_database(&config).await?;
    let state = Arc::new(AppState::new(config.clone(), pool));

    let dispatcher = JobDispatcher::spawn(
        state.social_jobs.clone(),
        state.creators.clone(),
        DispatcherConfig {
            worker_url: config.fetch_worker_url.clone(),
            internal_secret: config.internal_shared_secret.clone(),
            poll_interval_ms: config.dispatch_poll_interval_ms,
            batch_size: config.dispatch_batch_size,
            max_attempts: config.dispatch_max_attempts,
        },
    );

    let router = routes::setup_routes(&config, state.clone())?;
    Ok((state, router, dispatcher))
}
