use std::env;
use std::fmt;
use std::time::Duration;

/// Runtime configuration for talking to Railway
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    // Credentials
    pub api_token: String,
    pub workspace_id: String,

    // Auto-refresh
    pub auto_refresh_enabled: bool,
    pub refresh_interval: RefreshInterval,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if exists

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Missing credentials are not an error: an incomplete configuration is
    /// a valid state that only blocks remote calls.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auto_refresh_enabled = match lookup("RAILBAR_AUTO_REFRESH") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid("RAILBAR_AUTO_REFRESH"))?,
            None => false,
        };

        let refresh_interval = match lookup("RAILBAR_REFRESH_INTERVAL") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .and_then(|secs| RefreshInterval::try_from(secs).ok())
                .ok_or(ConfigError::Invalid("RAILBAR_REFRESH_INTERVAL"))?,
            None => RefreshInterval::default(),
        };

        Ok(Self {
            api_token: lookup("RAILWAY_API_TOKEN").unwrap_or_default(),
            workspace_id: lookup("RAILWAY_WORKSPACE_ID").unwrap_or_default(),
            auto_refresh_enabled,
            refresh_interval,
        })
    }

    /// Whether both credentials are present
    pub fn is_complete(&self) -> bool {
        !self.api_token.trim().is_empty() && !self.workspace_id.trim().is_empty()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            workspace_id: String::new(),
            auto_refresh_enabled: false,
            refresh_interval: RefreshInterval::default(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.api_token.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("Config")
            .field("api_token", &token)
            .field("workspace_id", &self.workspace_id)
            .field("auto_refresh_enabled", &self.auto_refresh_enabled)
            .field("refresh_interval", &self.refresh_interval)
            .finish()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Selectable auto-refresh periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefreshInterval {
    FifteenSeconds,
    #[default]
    ThirtySeconds,
    OneMinute,
    FiveMinutes,
}

impl RefreshInterval {
    pub const ALL: [RefreshInterval; 4] = [
        Self::FifteenSeconds,
        Self::ThirtySeconds,
        Self::OneMinute,
        Self::FiveMinutes,
    ];

    pub fn as_secs(&self) -> u64 {
        match self {
            Self::FifteenSeconds => 15,
            Self::ThirtySeconds => 30,
            Self::OneMinute => 60,
            Self::FiveMinutes => 300,
        }
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.as_secs())
    }
}

impl TryFrom<u64> for RefreshInterval {
    type Error = ConfigError;

    fn try_from(secs: u64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|interval| interval.as_secs() == secs)
            .ok_or(ConfigError::Invalid("refresh interval"))
    }
}

impl fmt::Display for RefreshInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FifteenSeconds => write!(f, "15 seconds"),
            Self::ThirtySeconds => write!(f, "30 seconds"),
            Self::OneMinute => write!(f, "1 minute"),
            Self::FiveMinutes => write!(f, "5 minutes"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    Invalid(&'static str),
}
