/// Failure of a single GraphQL round trip
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid API endpoint URL: {0}")]
    InvalidEndpointUrl(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API error: {0}")]
    GraphQl(String),

    #[error("Unauthorized: check your API token")]
    Unauthorized,

    #[error("Unknown error: the response contained no data")]
    Unknown,
}

/// Result type alias for API client calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Error surfaced by application state operations
///
/// The `Display` output is what ends up in the state's error slot.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Please set your Railway API token and workspace ID in settings")]
    ConfigurationIncomplete,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AppError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Api(ApiError::Unauthorized))
    }
}

/// Result type alias for state operations
pub type AppResult<T> = Result<T, AppError>;
