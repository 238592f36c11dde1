//! HTTP server for the todolist service
//!
//! Exposes CRUD over tasks stored in PostgreSQL.

mod config;
mod middleware;
mod routes;
mod server;
mod state;

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::state::AppState;
use todolist_core::task::PgTaskStore;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todolist_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(error) = run().await {
        tracing::error!("{:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let task_store = PgTaskStore::connect(config.pg_options())
        .await
        .context("failed to connect to the task database")?;
    let app_state = AppState::new(Arc::new(task_store));

    let app = routes::app(app_state, &config.router_options());
    if config.auth.is_some() {
        tracing::info!("Basic auth enabled on task routes");
    }

    let listener = TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    tracing::info!("starting to listen {}", config.addr);

    server::serve(listener, app, server::shutdown_signal(), server::SHUTDOWN_GRACE).await
}
