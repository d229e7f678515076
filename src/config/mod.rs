// Configuration module entry point
// Loads application, logging and local server settings

mod types;

use std::net::SocketAddr;

// Re-export public types
pub use types::{AppConfig, CacheConfig, Config, LoggingConfig, ServerConfig};

/// Default config file name, without extension
pub const DEFAULT_CONFIG_PATH: &str = "landsat-tiler";

impl Config {
    /// Load configuration from `landsat-tiler.toml` and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional. Environment variables such as
    /// `TILER__SERVER__PORT=9000` override it.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("TILER").separator("__"))
            .set_default("app.name", "landsat-tiler")?
            .set_default("app.debug", true)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.connection_timeout", 30)?
            .set_default("server.backlog", 128)?
            .set_default("server.reuse_port", true)?
            .set_default("cache.size", 128)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
