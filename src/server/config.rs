use super::{RequestsLoggingLevel, StatusCodeScheme};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub host: String,
    pub port: u16,
    pub status_codes: StatusCodeScheme,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            host: "127.0.0.1".to_string(),
            port: 8000,
            status_codes: StatusCodeScheme::Legacy,
        }
    }
}
