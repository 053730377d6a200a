// Static GraphQL documents
// Every parameter is a declared GraphQL variable; nothing user-supplied is
// spliced into document text

/// A named GraphQL document and the root field its result lives under
#[derive(Debug, Clone, Copy)]
pub struct Operation {
    pub name: &'static str,
    pub field: &'static str,
    pub document: &'static str,
}

/// Page size for the deployment listing; no cursor is ever sent
pub const DEPLOYMENT_PAGE_SIZE: u32 = 10;

pub const PROJECTS: Operation = Operation {
    name: "Projects",
    field: "workspace",
    document: r#"query Projects($workspaceId: String!) {
  workspace(workspaceId: $workspaceId) {
    projects {
      edges {
        node {
          id
          name
          services { edges { node { id name } } }
          environments { edges { node { id name } } }
        }
      }
    }
  }
}"#,
};

pub const SERVICE_CREATE: Operation = Operation {
    name: "ServiceCreate",
    field: "serviceCreate",
    document: r#"mutation ServiceCreate($input: ServiceCreateInput!) {
  serviceCreate(input: $input) { id }
}"#,
};

pub const VARIABLES: Operation = Operation {
    name: "Variables",
    field: "variables",
    document: r#"query Variables($projectId: String!, $environmentId: String!, $serviceId: String) {
  variables(projectId: $projectId, environmentId: $environmentId, serviceId: $serviceId)
}"#,
};

pub const VARIABLE_UPSERT: Operation = Operation {
    name: "VariableUpsert",
    field: "variableUpsert",
    document: r#"mutation VariableUpsert($input: VariableUpsertInput!) {
  variableUpsert(input: $input)
}"#,
};

pub const VARIABLE_DELETE: Operation = Operation {
    name: "VariableDelete",
    field: "variableDelete",
    document: r#"mutation VariableDelete($input: VariableDeleteInput!) {
  variableDelete(input: $input)
}"#,
};

pub const PROJECT_DELETE: Operation = Operation {
    name: "ProjectDelete",
    field: "projectDelete",
    document: r#"mutation ProjectDelete($id: String!) {
  projectDelete(id: $id)
}"#,
};

pub const SERVICE_DELETE: Operation = Operation {
    name: "ServiceDelete",
    field: "serviceDelete",
    document: r#"mutation ServiceDelete($id: String!) {
  serviceDelete(id: $id)
}"#,
};

pub const DEPLOYMENTS: Operation = Operation {
    name: "Deployments",
    field: "deployments",
    document: r#"query Deployments($first: Int!, $input: DeploymentListInput!) {
  deployments(first: $first, input: $input) {
    edges {
      node { id status staticUrl createdAt }
    }
  }
}"#,
};

pub const DEPLOYMENT_RESTART: Operation = Operation {
    name: "DeploymentRestart",
    field: "deploymentRestart",
    document: r#"mutation DeploymentRestart($id: String!) {
  deploymentRestart(id: $id)
}"#,
};

pub const SERVICE_INSTANCE_REDEPLOY: Operation = Operation {
    name: "ServiceInstanceRedeploy",
    field: "serviceInstanceRedeploy",
    document: r#"mutation ServiceInstanceRedeploy($environmentId: String!, $serviceId: String!) {
  serviceInstanceRedeploy(environmentId: $environmentId, serviceId: $serviceId)
}"#,
};
