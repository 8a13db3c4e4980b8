use std::time::Duration;

/// Configuration for the command dispatcher
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Base URL of the actuator (e.g., "http://localhost:3000")
    pub base_url: String,

    /// Value of the `source` field in command bodies
    pub source: String,

    /// Deadline for each speak/stop attempt
    /// Default: 5 seconds
    pub request_timeout: Duration,

    /// Deadline for the health probe
    /// Default: 5 seconds
    pub health_timeout: Duration,

    /// Maximum attempts for a speak command
    pub max_retries: u32,

    /// Backoff unit; the wait after failed attempt N is N times this
    pub backoff_base: Duration,
}

impl DispatcherConfig {
    /// Absolute URL for an API path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            source: "chat-widget".to_string(),
            request_timeout: Duration::from_millis(5000),
            health_timeout: Duration::from_millis(5000),
            max_retries: 3,
            backoff_base: Duration::from_millis(1000),
        }
    }
}
