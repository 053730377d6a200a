use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::api::graphql::{interpret_response, Connection, GraphqlRequest};
use crate::api::queries::{self, Operation, DEPLOYMENT_PAGE_SIZE};
use crate::api::RailwayApi;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    Deployment, Environment, Project, Service, ServiceScope, ServiceSource, Variables,
};

/// Public Railway GraphQL endpoint
pub const RAILWAY_API_ENDPOINT: &str = "https://backboard.railway.app/graphql/v2";

/// HTTPS client for the Railway GraphQL API
#[derive(Debug, Clone)]
pub struct RailwayClient {
    client: Client,
    endpoint: Url,
}

impl RailwayClient {
    /// Create a client for the public endpoint
    pub fn new() -> ApiResult<Self> {
        Self::with_endpoint(RAILWAY_API_ENDPOINT)
    }

    /// Create a client for a custom endpoint (proxies, tests)
    pub fn with_endpoint(endpoint: &str) -> ApiResult<Self> {
        let url = Url::parse(endpoint)
            .map_err(|e| ApiError::InvalidEndpointUrl(format!("{}: {}", endpoint, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidEndpointUrl(format!(
                "{}: unsupported scheme",
                endpoint
            )));
        }

        Ok(Self {
            client: Client::new(),
            endpoint: url,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Execute one operation and decode its root field
    async fn execute<T: DeserializeOwned>(
        &self,
        token: &str,
        operation: &Operation,
        variables: serde_json::Value,
    ) -> ApiResult<T> {
        tracing::debug!(operation = operation.name, "Sending GraphQL request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .json(&GraphqlRequest::new(operation, &variables))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        let result = interpret_response(status, &body, operation.field);
        if let Err(e) = &result {
            tracing::warn!(
                operation = operation.name,
                status = status.as_u16(),
                error = %e,
                "GraphQL request failed"
            );
        }
        result
    }
}

// ============ Wire shapes ============

#[derive(Debug, Deserialize)]
struct Workspace {
    projects: Connection<ProjectNode>,
}

#[derive(Debug, Deserialize)]
struct ProjectNode {
    id: String,
    name: String,
    services: Connection<Service>,
    environments: Connection<Environment>,
}

impl From<ProjectNode> for Project {
    fn from(node: ProjectNode) -> Self {
        Self {
            id: node.id,
            name: node.name,
            services: node.services.into_nodes(),
            environments: node.environments.into_nodes(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedService {
    id: String,
}

fn scope_input(scope: &ServiceScope) -> serde_json::Value {
    json!({
        "projectId": scope.project_id,
        "environmentId": scope.environment_id,
        "serviceId": scope.service_id,
    })
}

#[async_trait]
impl RailwayApi for RailwayClient {
    #[tracing::instrument(skip(self, token))]
    async fn fetch_projects(&self, token: &str, workspace_id: &str) -> ApiResult<Vec<Project>> {
        let workspace: Workspace = self
            .execute(token, &queries::PROJECTS, json!({ "workspaceId": workspace_id }))
            .await?;

        Ok(workspace
            .projects
            .into_nodes()
            .into_iter()
            .map(Project::from)
            .collect())
    }

    #[tracing::instrument(skip(self, token))]
    async fn create_service(
        &self,
        token: &str,
        project_id: &str,
        source: &ServiceSource,
    ) -> ApiResult<String> {
        let created: CreatedService = self
            .execute(
                token,
                &queries::SERVICE_CREATE,
                json!({ "input": { "projectId": project_id, "source": source } }),
            )
            .await?;

        Ok(created.id)
    }

    #[tracing::instrument(skip(self, token))]
    async fn fetch_variables(&self, token: &str, scope: &ServiceScope) -> ApiResult<Variables> {
        self.execute(token, &queries::VARIABLES, scope_input(scope))
            .await
    }

    #[tracing::instrument(skip(self, token, value))]
    async fn upsert_variable(
        &self,
        token: &str,
        scope: &ServiceScope,
        name: &str,
        value: &str,
    ) -> ApiResult<bool> {
        let mut input = scope_input(scope);
        input["name"] = json!(name);
        input["value"] = json!(value);

        self.execute(token, &queries::VARIABLE_UPSERT, json!({ "input": input }))
            .await
    }

    #[tracing::instrument(skip(self, token))]
    async fn delete_variable(
        &self,
        token: &str,
        scope: &ServiceScope,
        name: &str,
    ) -> ApiResult<bool> {
        let mut input = scope_input(scope);
        input["name"] = json!(name);

        self.execute(token, &queries::VARIABLE_DELETE, json!({ "input": input }))
            .await
    }

    #[tracing::instrument(skip(self, token))]
    async fn delete_project(&self, token: &str, project_id: &str) -> ApiResult<bool> {
        self.execute(token, &queries::PROJECT_DELETE, json!({ "id": project_id }))
            .await
    }

    #[tracing::instrument(skip(self, token))]
    async fn delete_service(&self, token: &str, service_id: &str) -> ApiResult<bool> {
        self.execute(token, &queries::SERVICE_DELETE, json!({ "id": service_id }))
            .await
    }

    #[tracing::instrument(skip(self, token))]
    async fn fetch_deployments(
        &self,
        token: &str,
        scope: &ServiceScope,
    ) -> ApiResult<Vec<Deployment>> {
        let deployments: Connection<Deployment> = self
            .execute(
                token,
                &queries::DEPLOYMENTS,
                json!({ "first": DEPLOYMENT_PAGE_SIZE, "input": scope_input(scope) }),
            )
            .await?;

        Ok(deployments.into_nodes())
    }

    #[tracing::instrument(skip(self, token))]
    async fn restart_deployment(&self, token: &str, deployment_id: &str) -> ApiResult<bool> {
        self.execute(
            token,
            &queries::DEPLOYMENT_RESTART,
            json!({ "id": deployment_id }),
        )
        .await
    }

    #[tracing::instrument(skip(self, token))]
    async fn redeploy_service(
        &self,
        token: &str,
        environment_id: &str,
        service_id: &str,
    ) -> ApiResult<bool> {
        self.execute(
            token,
            &queries::SERVICE_INSTANCE_REDEPLOY,
            json!({ "environmentId": environment_id, "serviceId": service_id }),
        )
        .await
    }
}
