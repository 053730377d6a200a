use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Environment variables of one service instance, keyed by name
pub type Variables = BTreeMap<String, String>;

/// Identifies a service inside one environment of a project
///
/// Variables and deployments are both scoped by this triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceScope {
    pub project_id: String,
    pub environment_id: String,
    pub service_id: String,
}

impl ServiceScope {
    pub fn new(
        project_id: impl Into<String>,
        environment_id: impl Into<String>,
        service_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            environment_id: environment_id.into(),
            service_id: service_id.into(),
        }
    }
}
