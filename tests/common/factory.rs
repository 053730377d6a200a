use std::sync::Arc;

use railbar::api::InMemoryApi;
use railbar::config::{Config, RefreshInterval};
use railbar::models::{Deployment, DeploymentStatus, Environment, Project, Service};
use railbar::state::AppState;

pub const TOKEN: &str = "test-token";
pub const WORKSPACE: &str = "ws-test";

/// Config with both credentials set and auto-refresh off
pub fn complete_config() -> Config {
    Config {
        api_token: TOKEN.to_string(),
        workspace_id: WORKSPACE.to_string(),
        auto_refresh_enabled: false,
        refresh_interval: RefreshInterval::ThirtySeconds,
    }
}

/// Config with auto-refresh on at the given interval
pub fn refreshing_config(interval: RefreshInterval) -> Config {
    Config {
        auto_refresh_enabled: true,
        refresh_interval: interval,
        ..complete_config()
    }
}

/// Project with one service and a production environment, ids derived from `id`
pub fn project(id: &str) -> Project {
    Project {
        id: id.to_string(),
        name: format!("project-{}", id),
        services: vec![Service {
            id: format!("{}-svc", id),
            name: "web".to_string(),
        }],
        environments: vec![Environment {
            id: format!("{}-env", id),
            name: "production".to_string(),
        }],
    }
}

pub fn deployment(id: &str, status: DeploymentStatus) -> Deployment {
    Deployment {
        id: id.to_string(),
        status,
        static_url: None,
        created_at: "2024-05-01T12:00:00Z".to_string(),
    }
}

/// State wired to a fake workspace; the returned api shares that workspace
pub fn state_with(api: &InMemoryApi, config: Config) -> AppState {
    AppState::new(config, Arc::new(api.clone()))
}
