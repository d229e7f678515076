// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Application identity
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Name used as the log line prefix
    pub name: String,
    /// DEBUG logging when true, ERROR otherwise (unless `logging.level` is set)
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "landsat-tiler".to_string(),
            debug: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Explicit level (trace, debug, info, warn, error, off)
    #[serde(default)]
    pub level: Option<String>,
    pub access_log: bool,
    /// Access log format (common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Log file path (optional, stdout if not set)
    #[serde(default)]
    pub log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "common".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            access_log: true,
            access_log_format: default_access_log_format(),
            log_file: None,
        }
    }
}

/// Local gateway server configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Seconds before an idle or slow connection is dropped
    pub connection_timeout: u64,
    /// Listen backlog
    pub backlog: u32,
    /// Share the port with other tiler processes (`SO_REUSEPORT`)
    pub reuse_port: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: None,
            connection_timeout: 30,
            backlog: 128,
            reuse_port: true,
        }
    }
}

/// Reply cache for the data routes
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum cached replies; 0 disables the cache
    pub size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { size: 128 }
    }
}
