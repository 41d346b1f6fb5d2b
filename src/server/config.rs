use super::RequestsLoggingLevel;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub host: String,
    pub port: u16,
    /// How long in-flight requests may keep running after shutdown is
    /// requested.
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            host: "localhost".to_string(),
            port: 8080,
            shutdown_grace: Duration::from_secs(10),
        }
    }
}
