use std::fmt;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Deployment status as reported by Railway
///
/// Statuses this client does not know about decode as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentStatus {
    Success,
    Building,
    Deploying,
    Failed,
    Crashed,
    Removed,
    Sleeping,
    #[serde(other)]
    Unknown,
}

impl DeploymentStatus {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Building | Self::Deploying)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Crashed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Building => "building",
            Self::Deploying => "deploying",
            Self::Failed => "failed",
            Self::Crashed => "crashed",
            Self::Removed => "removed",
            Self::Sleeping => "sleeping",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "Success",
            Self::Building => "Building",
            Self::Deploying => "Deploying",
            Self::Failed => "Failed",
            Self::Crashed => "Crashed",
            Self::Removed => "Removed",
            Self::Sleeping => "Sleeping",
            Self::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// One build/release of a service in an environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: String,
    pub status: DeploymentStatus,
    #[serde(default)]
    pub static_url: Option<String>,
    pub created_at: String,
}

impl Deployment {
    /// Parsed `created_at`, if the server sent RFC 3339
    pub fn created_at_time(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(&self.created_at, &Rfc3339).ok()
    }

    /// Browsable URL of the deployment, if it has a public domain
    pub fn public_url(&self) -> Option<String> {
        let url = self.static_url.as_deref()?.trim();
        if url.is_empty() {
            return None;
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            Some(url.to_string())
        } else {
            Some(format!("https://{}", url))
        }
    }
}
