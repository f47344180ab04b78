use std::env;
use std::path::PathBuf;

use folio_core::fetch::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use folio_core::{DEFAULT_STORAGE_DIR, FetchConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub output_dir: PathBuf,
    pub fetch_timeout: u64,
    pub user_agent: String,
    pub namespace_sessions: bool,
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            output_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            fetch_timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            namespace_sessions: false,
            log_level: "folio_server=info,folio_core=info,tower_http=info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = env::var("FOLIO_HOST") {
            config.host = host;
        }

        if let Ok(port_str) = env::var("FOLIO_PORT") {
            match port_str.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => eprintln!(
                    "Warning: Invalid FOLIO_PORT value '{}', using default {}",
                    port_str, config.port
                ),
            }
        }

        if let Ok(dir) = env::var("FOLIO_OUTPUT_DIR")
            && !dir.trim().is_empty()
        {
            config.output_dir = PathBuf::from(dir);
        }

        if let Ok(timeout_str) = env::var("FOLIO_FETCH_TIMEOUT") {
            match timeout_str.parse::<u64>() {
                Ok(timeout) if timeout > 0 => config.fetch_timeout = timeout,
                _ => eprintln!(
                    "Warning: Invalid FOLIO_FETCH_TIMEOUT value '{}', using default {}",
                    timeout_str, config.fetch_timeout
                ),
            }
        }

        if let Ok(user_agent) = env::var("FOLIO_USER_AGENT")
            && !user_agent.trim().is_empty()
        {
            config.user_agent = user_agent;
        }

        if let Ok(value) = env::var("FOLIO_NAMESPACE_SESSIONS") {
            config.namespace_sessions = matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            config.log_level = log_level;
        } else if let Ok(log_level) = env::var("FOLIO_LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Ok(log_format) = env::var("FOLIO_LOG_FORMAT") {
            config.log_format = match log_format.to_lowercase().as_str() {
                "text" | "plain" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    eprintln!("Warning: Invalid FOLIO_LOG_FORMAT value '{}', using text", log_format);
                    LogFormat::Text
                }
            };
        }

        config
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig { timeout: self.fetch_timeout, user_agent: self.user_agent.clone() }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
