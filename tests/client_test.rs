mod common;

use std::io;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tracing_subscriber::fmt::MakeWriter;

use railbar::api::{RailwayApi, RailwayClient};
use railbar::error::ApiError;
use railbar::models::{DeploymentStatus, ServiceScope, ServiceSource};

use common::{closed_endpoint, MockRailway};

fn scope() -> ServiceScope {
    ServiceScope::new("p1", "e1", "s1")
}

#[tokio::test]
async fn test_sends_bearer_token_and_json_body() {
    let mock = MockRailway::start().await;
    mock.respond_data(json!({ "projectDelete": true }));

    let deleted = mock.client().delete_project("secret-token", "p1").await.unwrap();
    assert!(deleted);

    let request = mock.last_request();
    assert_eq!(request.header("authorization"), Some("Bearer secret-token"));
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.body["operationName"], "ProjectDelete");
    assert!(request.query().contains("projectDelete(id: $id)"));
    assert_eq!(request.variables(), &json!({ "id": "p1" }));
}

#[tokio::test]
async fn test_fetch_projects_flattens_edges() {
    let mock = MockRailway::start().await;
    mock.respond_data(json!({
        "workspace": { "projects": { "edges": [
            { "node": {
                "id": "p1",
                "name": "shop",
                "services": { "edges": [
                    { "node": { "id": "s1", "name": "api" } },
                    { "node": { "id": "s2", "name": "worker" } }
                ] },
                "environments": { "edges": [
                    { "node": { "id": "e1", "name": "production" } }
                ] }
            } },
            { "node": {
                "id": "p2",
                "name": "blog",
                "services": { "edges": [] },
                "environments": { "edges": [] }
            } }
        ] } }
    }));

    let projects = mock.client().fetch_projects("t", "ws-1").await.unwrap();

    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0].name, "shop");
    assert_eq!(projects[0].services.len(), 2);
    assert_eq!(projects[0].services[1].name, "worker");
    assert_eq!(projects[0].environments[0].id, "e1");
    assert!(projects[1].services.is_empty());

    let request = mock.last_request();
    assert_eq!(request.variables(), &json!({ "workspaceId": "ws-1" }));
    assert!(request.query().contains("workspace(workspaceId: $workspaceId)"));
}

#[tokio::test]
async fn test_empty_workspace() {
    let mock = MockRailway::start().await;
    mock.respond_data(json!({ "workspace": { "projects": { "edges": [] } } }));

    let projects = mock.client().fetch_projects("t", "ws").await.unwrap();
    assert!(projects.is_empty());
}

#[tokio::test]
async fn test_unauthorized_status_wins_over_body() {
    let mock = MockRailway::start().await;
    mock.respond(401, json!({ "data": { "projectDelete": true } }));
    mock.respond(401, json!({ "errors": [{ "message": "Not Authorized" }] }));

    let client = mock.client();
    assert!(matches!(
        client.delete_project("t", "p1").await,
        Err(ApiError::Unauthorized)
    ));
    assert!(matches!(
        client.fetch_projects("t", "ws").await,
        Err(ApiError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_graphql_errors_are_joined() {
    let mock = MockRailway::start().await;
    mock.respond(
        200,
        json!({
            "data": { "serviceDelete": true },
            "errors": [
                { "message": "Service not found" },
                { "message": "Problem processing request" }
            ]
        }),
    );

    match mock.client().delete_service("t", "s1").await {
        Err(ApiError::GraphQl(message)) => {
            assert_eq!(message, "Service not found, Problem processing request")
        }
        other => panic!("expected GraphQL error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let mock = MockRailway::start().await;
    mock.respond_raw(502, "<html>Bad Gateway</html>");

    assert!(matches!(
        mock.client().fetch_projects("t", "ws").await,
        Err(ApiError::Decode(_))
    ));
}

#[tokio::test]
async fn test_unexpected_shape_is_decode_error() {
    let mock = MockRailway::start().await;
    mock.respond_data(json!({ "workspace": { "projects": "nope" } }));

    assert!(matches!(
        mock.client().fetch_projects("t", "ws").await,
        Err(ApiError::Decode(_))
    ));
}

#[tokio::test]
async fn test_missing_data_is_unknown() {
    let mock = MockRailway::start().await;
    mock.respond(200, json!({ "data": null }));

    assert!(matches!(
        mock.client().restart_deployment("t", "d1").await,
        Err(ApiError::Unknown)
    ));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let client = RailwayClient::with_endpoint(&closed_endpoint().await).unwrap();

    let err = client.fetch_projects("t", "ws").await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert!(err.to_string().starts_with("Network error"));
}

#[tokio::test]
async fn test_create_service_source_variants() {
    let mock = MockRailway::start().await;
    mock.respond_data(json!({ "serviceCreate": { "id": "svc-new" } }));
    mock.respond_data(json!({ "serviceCreate": { "id": "svc-redis" } }));

    let client = mock.client();
    let repo_id = client
        .create_service("t", "p1", &ServiceSource::Repo("owner/repo".to_string()))
        .await
        .unwrap();
    let image_id = client
        .create_service("t", "p1", &ServiceSource::Image("redis:7".to_string()))
        .await
        .unwrap();

    assert_eq!(repo_id, "svc-new");
    assert_eq!(image_id, "svc-redis");

    let requests = mock.requests();
    assert_eq!(
        requests[0].variables(),
        &json!({ "input": { "projectId": "p1", "source": { "repo": "owner/repo" } } })
    );
    assert_eq!(
        requests[1].variables(),
        &json!({ "input": { "projectId": "p1", "source": { "image": "redis:7" } } })
    );
}

#[tokio::test]
async fn test_fetch_variables_mapping() {
    let mock = MockRailway::start().await;
    mock.respond_data(json!({
        "variables": { "PORT": "8080", "DATABASE_URL": "postgres://db" }
    }));

    let vars = mock.client().fetch_variables("t", &scope()).await.unwrap();

    assert_eq!(vars.len(), 2);
    assert_eq!(vars["PORT"], "8080");
    assert_eq!(vars.keys().next().map(String::as_str), Some("DATABASE_URL"));
    assert_eq!(
        mock.last_request().variables(),
        &json!({ "projectId": "p1", "environmentId": "e1", "serviceId": "s1" })
    );
}

#[tokio::test]
async fn test_variable_value_is_never_spliced_into_document() {
    let mock = MockRailway::start().await;
    mock.respond_data(json!({ "variableUpsert": true }));

    let tricky = "say \"hi\"\nthen } leave";
    let ok = mock
        .client()
        .upsert_variable("t", &scope(), "GREETING", tricky)
        .await
        .unwrap();
    assert!(ok);

    let request = mock.last_request();
    assert_eq!(request.variables()["input"]["value"], tricky);
    assert_eq!(request.variables()["input"]["name"], "GREETING");
    assert_eq!(request.variables()["input"]["serviceId"], "s1");
    assert!(!request.query().contains("GREETING"));
    assert!(!request.query().contains("hi"));
}

/// Collects formatted log output in memory
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn test_variable_calls_are_traced_without_secrets() {
    let mock = MockRailway::start().await;
    mock.respond_data(json!({ "variableUpsert": true }));
    mock.respond_data(json!({ "variables": { "API_KEY": "hunter2" } }));
    mock.respond_data(json!({ "variableDelete": true }));
    mock.respond_data(json!({ "deployments": { "edges": [] } }));

    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let client = mock.client();
    client
        .upsert_variable("secret-token", &scope(), "API_KEY", "hunter2")
        .await
        .unwrap();
    client.fetch_variables("secret-token", &scope()).await.unwrap();
    client
        .delete_variable("secret-token", &scope(), "API_KEY")
        .await
        .unwrap();
    client.fetch_deployments("secret-token", &scope()).await.unwrap();

    let output = logs.contents();
    for span in [
        "upsert_variable",
        "fetch_variables",
        "delete_variable",
        "fetch_deployments",
    ] {
        assert!(output.contains(span), "no {} span in:\n{}", span, output);
    }
    assert!(output.contains("API_KEY"));
    assert!(!output.contains("hunter2"));
    assert!(!output.contains("secret-token"));
}

#[tokio::test]
async fn test_delete_variable_input() {
    let mock = MockRailway::start().await;
    mock.respond_data(json!({ "variableDelete": true }));

    assert!(mock.client().delete_variable("t", &scope(), "PORT").await.unwrap());
    assert_eq!(
        mock.last_request().variables(),
        &json!({ "input": {
            "projectId": "p1",
            "environmentId": "e1",
            "serviceId": "s1",
            "name": "PORT"
        } })
    );
}

#[tokio::test]
async fn test_deployments_use_fixed_page_size() {
    let mock = MockRailway::start().await;
    mock.respond_data(json!({ "deployments": { "edges": [
        { "node": {
            "id": "d2",
            "status": "BUILDING",
            "staticUrl": null,
            "createdAt": "2024-05-02T08:00:00.000Z"
        } },
        { "node": {
            "id": "d1",
            "status": "SUCCESS",
            "staticUrl": "web-production.up.railway.app",
            "createdAt": "2024-05-01T08:00:00.000Z"
        } },
        { "node": {
            "id": "d0",
            "status": "INITIALIZING",
            "staticUrl": null,
            "createdAt": "2024-04-30T08:00:00.000Z"
        } }
    ] } }));

    let deployments = mock.client().fetch_deployments("t", &scope()).await.unwrap();

    assert_eq!(deployments.len(), 3);
    assert_eq!(deployments[0].status, DeploymentStatus::Building);
    assert_eq!(deployments[1].status, DeploymentStatus::Success);
    assert_eq!(
        deployments[1].public_url().as_deref(),
        Some("https://web-production.up.railway.app")
    );
    assert_eq!(deployments[2].status, DeploymentStatus::Unknown);

    let variables = mock.last_request().variables().clone();
    assert_eq!(variables["first"], 10);
    assert_eq!(
        variables["input"],
        json!({ "projectId": "p1", "environmentId": "e1", "serviceId": "s1" })
    );
    assert!(variables.get("after").is_none());
}

#[tokio::test]
async fn test_redeploy_and_restart() {
    let mock = MockRailway::start().await;
    mock.respond_data(json!({ "serviceInstanceRedeploy": true }));
    mock.respond_data(json!({ "deploymentRestart": false }));

    let client = mock.client();
    assert!(client.redeploy_service("t", "e1", "s1").await.unwrap());
    assert!(!client.restart_deployment("t", "d1").await.unwrap());

    let requests = mock.requests();
    assert_eq!(
        requests[0].variables(),
        &json!({ "environmentId": "e1", "serviceId": "s1" })
    );
    assert_eq!(requests[1].variables(), &json!({ "id": "d1" }));
}
