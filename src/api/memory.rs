use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::api::queries::{self, DEPLOYMENT_PAGE_SIZE};
use crate::api::RailwayApi;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    Deployment, DeploymentStatus, Project, Service, ServiceScope, ServiceSource, Variables,
};

/// Failure the fake returns instead of touching the workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectedFailure {
    Unauthorized,
    GraphQl(String),
    Unknown,
}

impl From<&InjectedFailure> for ApiError {
    fn from(failure: &InjectedFailure) -> Self {
        match failure {
            InjectedFailure::Unauthorized => ApiError::Unauthorized,
            InjectedFailure::GraphQl(msg) => ApiError::GraphQl(msg.clone()),
            InjectedFailure::Unknown => ApiError::Unknown,
        }
    }
}

/// In-memory Railway workspace for testing
#[derive(Clone)]
pub struct InMemoryApi {
    inner: Arc<Mutex<InMemoryApiInner>>,
}

#[derive(Default)]
struct InMemoryApiInner {
    projects: Vec<Project>,
    variables: HashMap<ServiceScope, Variables>,
    /// Newest first
    deployments: HashMap<ServiceScope, Vec<Deployment>>,
    requests: Vec<&'static str>,
    accepted_token: Option<String>,
    failure: Option<InjectedFailure>,
    /// One-shot failures keyed by operation name
    failures_once: HashMap<&'static str, InjectedFailure>,
    latency: Option<Duration>,
    next_id: u64,
}

impl InMemoryApiInner {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(InMemoryApiInner::default())),
        }
    }

    /// Seed the workspace with projects
    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(InMemoryApiInner {
                projects,
                ..Default::default()
            })),
        }
    }

    /// Reject every token except this one with `Unauthorized`
    pub async fn accept_only_token(&self, token: impl Into<String>) {
        self.inner.lock().await.accepted_token = Some(token.into());
    }

    pub async fn add_project(&self, project: Project) {
        self.inner.lock().await.projects.push(project);
    }

    /// Record a new deployment as the most recent one for the scope
    pub async fn push_deployment(&self, scope: ServiceScope, deployment: Deployment) {
        self.inner
            .lock()
            .await
            .deployments
            .entry(scope)
            .or_default()
            .insert(0, deployment);
    }

    /// Fail every call until `clear_failure`
    pub async fn fail_with(&self, failure: InjectedFailure) {
        self.inner.lock().await.failure = Some(failure);
    }

    pub async fn clear_failure(&self) {
        let mut inner = self.inner.lock().await;
        inner.failure = None;
        inner.failures_once.clear();
    }

    /// Fail only the next call of one operation, e.g. `"Projects"`
    pub async fn fail_next(&self, operation: &'static str, failure: InjectedFailure) {
        self.inner
            .lock()
            .await
            .failures_once
            .insert(operation, failure);
    }

    /// Delay every call by this long before it touches the workspace
    pub async fn set_latency(&self, latency: Duration) {
        self.inner.lock().await.latency = Some(latency);
    }

    pub async fn projects(&self) -> Vec<Project> {
        self.inner.lock().await.projects.clone()
    }

    /// Operation names in call order
    pub async fn requests(&self) -> Vec<&'static str> {
        self.inner.lock().await.requests.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.inner.lock().await.requests.len()
    }

    /// Number of calls made for one operation, e.g. `"Projects"`
    pub async fn count_of(&self, operation: &str) -> usize {
        self.inner
            .lock()
            .await
            .requests
            .iter()
            .filter(|name| **name == operation)
            .count()
    }

    /// Record the call, wait out any latency, then check token and failure
    async fn begin(&self, operation: &'static str, token: &str) -> ApiResult<()> {
        let latency = {
            let mut inner = self.inner.lock().await;
            inner.requests.push(operation);
            inner.latency
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut inner = self.inner.lock().await;
        if let Some(failure) = inner.failures_once.remove(operation) {
            return Err((&failure).into());
        }
        if let Some(failure) = &inner.failure {
            return Err(failure.into());
        }
        match &inner.accepted_token {
            Some(accepted) if accepted != token => Err(ApiError::Unauthorized),
            _ => Ok(()),
        }
    }
}

impl Default for InMemoryApi {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::GraphQl(format!("{} not found", what))
}

#[async_trait]
impl RailwayApi for InMemoryApi {
    async fn fetch_projects(&self, token: &str, _workspace_id: &str) -> ApiResult<Vec<Project>> {
        self.begin(queries::PROJECTS.name, token).await?;
        Ok(self.inner.lock().await.projects.clone())
    }

    async fn create_service(
        &self,
        token: &str,
        project_id: &str,
        source: &ServiceSource,
    ) -> ApiResult<String> {
        self.begin(queries::SERVICE_CREATE.name, token).await?;

        let mut inner = self.inner.lock().await;
        let id = inner.next_id("service");
        let project = inner
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| not_found("Project"))?;

        project.services.push(Service {
            id: id.clone(),
            name: source.suggested_name(),
        });
        Ok(id)
    }

    async fn fetch_variables(&self, token: &str, scope: &ServiceScope) -> ApiResult<Variables> {
        self.begin(queries::VARIABLES.name, token).await?;
        Ok(self
            .inner
            .lock()
            .await
            .variables
            .get(scope)
            .cloned()
            .unwrap_or_default())
    }

    async fn upsert_variable(
        &self,
        token: &str,
        scope: &ServiceScope,
        name: &str,
        value: &str,
    ) -> ApiResult<bool> {
        self.begin(queries::VARIABLE_UPSERT.name, token).await?;
        self.inner
            .lock()
            .await
            .variables
            .entry(scope.clone())
            .or_default()
            .insert(name.to_string(), value.to_string());
        Ok(true)
    }

    async fn delete_variable(
        &self,
        token: &str,
        scope: &ServiceScope,
        name: &str,
    ) -> ApiResult<bool> {
        self.begin(queries::VARIABLE_DELETE.name, token).await?;
        if let Some(vars) = self.inner.lock().await.variables.get_mut(scope) {
            vars.remove(name);
        }
        Ok(true)
    }

    async fn delete_project(&self, token: &str, project_id: &str) -> ApiResult<bool> {
        self.begin(queries::PROJECT_DELETE.name, token).await?;

        let mut inner = self.inner.lock().await;
        let before = inner.projects.len();
        inner.projects.retain(|p| p.id != project_id);
        if inner.projects.len() == before {
            return Err(not_found("Project"));
        }
        inner.variables.retain(|scope, _| scope.project_id != project_id);
        inner.deployments.retain(|scope, _| scope.project_id != project_id);
        Ok(true)
    }

    async fn delete_service(&self, token: &str, service_id: &str) -> ApiResult<bool> {
        self.begin(queries::SERVICE_DELETE.name, token).await?;

        let mut inner = self.inner.lock().await;
        let project = inner
            .projects
            .iter_mut()
            .find(|p| p.services.iter().any(|s| s.id == service_id))
            .ok_or_else(|| not_found("Service"))?;
        project.services.retain(|s| s.id != service_id);
        Ok(true)
    }

    async fn fetch_deployments(
        &self,
        token: &str,
        scope: &ServiceScope,
    ) -> ApiResult<Vec<Deployment>> {
        self.begin(queries::DEPLOYMENTS.name, token).await?;
        Ok(self
            .inner
            .lock()
            .await
            .deployments
            .get(scope)
            .map(|list| {
                list.iter()
                    .take(DEPLOYMENT_PAGE_SIZE as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn restart_deployment(&self, token: &str, deployment_id: &str) -> ApiResult<bool> {
        self.begin(queries::DEPLOYMENT_RESTART.name, token).await?;

        let mut inner = self.inner.lock().await;
        let deployment = inner
            .deployments
            .values_mut()
            .flat_map(|list| list.iter_mut())
            .find(|d| d.id == deployment_id)
            .ok_or_else(|| not_found("Deployment"))?;
        deployment.status = DeploymentStatus::Deploying;
        Ok(true)
    }

    async fn redeploy_service(
        &self,
        token: &str,
        environment_id: &str,
        service_id: &str,
    ) -> ApiResult<bool> {
        self.begin(queries::SERVICE_INSTANCE_REDEPLOY.name, token).await?;

        let mut inner = self.inner.lock().await;
        let project_id = inner
            .projects
            .iter()
            .find(|p| p.service(service_id).is_some() && p.environment(environment_id).is_some())
            .map(|p| p.id.clone())
            .ok_or_else(|| not_found("Service instance"))?;

        let id = inner.next_id("deployment");
        inner
            .deployments
            .entry(ServiceScope::new(project_id, environment_id, service_id))
            .or_default()
            .insert(
                0,
                Deployment {
                    id,
                    status: DeploymentStatus::Building,
                    static_url: None,
                    created_at: String::new(),
                },
            );
        Ok(true)
    }
}
