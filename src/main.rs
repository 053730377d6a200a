use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::signal;
use tracing_subscriber::EnvFilter;

use railbar::api::RailwayClient;
use railbar::config::Config;
use railbar::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting railbar...");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    if !config.is_complete() {
        tracing::error!("RAILWAY_API_TOKEN and RAILWAY_WORKSPACE_ID must both be set");
        bail!("configuration incomplete");
    }

    let client = RailwayClient::new().context("Failed to create Railway client")?;
    let state = AppState::new(config, Arc::new(client));

    // Initial listing
    state
        .fetch_projects()
        .await
        .context("Failed to fetch projects")?;
    log_projects(&state);

    state.sync_auto_refresh().await;
    match state.auto_refresh_interval().await {
        Some(interval) => tracing::info!(%interval, "Watching workspace, press Ctrl+C to exit"),
        None => tracing::info!("Auto-refresh disabled, press Ctrl+C to exit"),
    }

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping...");

    state.stop_auto_refresh().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("railbar=info"));

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn log_projects(state: &AppState) {
    let projects = state.projects();
    tracing::info!(count = projects.len(), "Workspace loaded");
    for project in &projects {
        tracing::info!(
            project_id = %project.id,
            name = %project.name,
            services = project.services.len(),
            environments = project.environments.len(),
            "Project"
        );
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
