pub mod client;
pub mod graphql;
pub mod memory;
pub mod queries;

pub use client::{RailwayClient, RAILWAY_API_ENDPOINT};
pub use memory::{InMemoryApi, InjectedFailure};
pub use queries::DEPLOYMENT_PAGE_SIZE;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::{Deployment, Project, ServiceScope, ServiceSource, Variables};

/// Railway operations used by the app
///
/// Each call is exactly one GraphQL round trip with no retries.
#[async_trait]
pub trait RailwayApi: Send + Sync {
    /// List every project in the workspace with its services and environments
    async fn fetch_projects(&self, token: &str, workspace_id: &str) -> ApiResult<Vec<Project>>;

    /// Create a service from a repo or image, returning the new service id
    async fn create_service(
        &self,
        token: &str,
        project_id: &str,
        source: &ServiceSource,
    ) -> ApiResult<String>;

    async fn fetch_variables(&self, token: &str, scope: &ServiceScope) -> ApiResult<Variables>;

    async fn upsert_variable(
        &self,
        token: &str,
        scope: &ServiceScope,
        name: &str,
        value: &str,
    ) -> ApiResult<bool>;

    async fn delete_variable(&self, token: &str, scope: &ServiceScope, name: &str)
        -> ApiResult<bool>;

    async fn delete_project(&self, token: &str, project_id: &str) -> ApiResult<bool>;

    async fn delete_service(&self, token: &str, service_id: &str) -> ApiResult<bool>;

    /// The most recent deployments, newest first, at most [`DEPLOYMENT_PAGE_SIZE`]
    async fn fetch_deployments(&self, token: &str, scope: &ServiceScope)
        -> ApiResult<Vec<Deployment>>;

    async fn restart_deployment(&self, token: &str, deployment_id: &str) -> ApiResult<bool>;

    async fn redeploy_service(
        &self,
        token: &str,
        environment_id: &str,
        service_id: &str,
    ) -> ApiResult<bool>;
}
