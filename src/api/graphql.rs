// GraphQL wire envelope shared by every operation

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::queries::Operation;
use crate::error::{ApiError, ApiResult};

/// Request body posted to the endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest<'a> {
    pub query: &'static str,
    pub operation_name: &'static str,
    pub variables: &'a serde_json::Value,
}

impl<'a> GraphqlRequest<'a> {
    pub fn new(operation: &Operation, variables: &'a serde_json::Value) -> Self {
        Self {
            query: operation.document,
            operation_name: operation.name,
            variables,
        }
    }
}

/// Top-level `{data, errors}` response
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// Relay-style connection as returned for list fields
#[derive(Debug, Deserialize)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

impl<T> Connection<T> {
    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|e| e.node).collect()
    }
}

/// Classify an HTTP response and decode the operation's root field
///
/// A 401 wins over anything in the body. GraphQL errors win over data.
pub fn interpret_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
    field: &str,
) -> ApiResult<T> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }

    let envelope: GraphqlResponse = serde_json::from_slice(body)?;

    if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
        let message = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ApiError::GraphQl(message));
    }

    let value = envelope
        .data
        .and_then(|mut data| data.remove(field))
        .filter(|value| !value.is_null())
        .ok_or(ApiError::Unknown)?;

    Ok(serde_json::from_value(value)?)
}
