use serde::{Deserialize, Serialize};

/// HTTP client settings shared by every source in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Connection timeout in seconds
    pub connect_timeout_seconds: u32,
    /// Request timeout in seconds
    pub request_timeout_seconds: u32,
    /// User agent to use (randomized browser agent by default)
    pub user_agent: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: 30,
            request_timeout_seconds: 60,
            user_agent: None,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<(), NetworkConfigError> {
        if self.connect_timeout_seconds == 0 {
            return Err(NetworkConfigError::ZeroTimeout("connect_timeout_seconds"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(NetworkConfigError::ZeroTimeout("request_timeout_seconds"));
        }
        if self.user_agent.as_deref().is_some_and(|ua| ua.trim().is_empty()) {
            return Err(NetworkConfigError::EmptyUserAgent);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkConfigError {
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
    #[error("user_agent is set but empty")]
    EmptyUserAgent,
}
