use serde::{Deserialize, Serialize};

/// Where a new service gets its code from
///
/// Serializes to the `source` input object of `serviceCreate`:
/// `{"repo": "owner/repo"}` or `{"image": "redis:7"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceSource {
    /// GitHub repository in `owner/repo` form
    Repo(String),
    /// Docker image reference
    Image(String),
}

impl ServiceSource {
    /// Name the platform assigns to a service created from this source
    pub fn suggested_name(&self) -> String {
        match self {
            ServiceSource::Repo(repo) => repo
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or(repo.as_str())
                .to_string(),
            ServiceSource::Image(image) => {
                let last = image.rsplit('/').next().unwrap_or(image.as_str());
                let without_digest = last.split('@').next().unwrap_or(last);
                without_digest
                    .split(':')
                    .next()
                    .unwrap_or(without_digest)
                    .to_string()
            }
        }
    }
}
