//! Logger module
//!
//! Provides logging utilities for the tiler including:
//! - One-time installation of the global `tracing` subscriber
//! - Route registration and dispatch failure logging
//! - Access logging with multiple formats

mod format;
pub mod writer;

pub use format::{AccessLogEntry, GatewayFormat};

use std::collections::BTreeSet;
use std::io;
use std::net::SocketAddr;
use std::sync::OnceLock;

use tracing::level_filters::LevelFilter;

use crate::config::Config;
use crate::handler::dispatch;

/// Set once the global subscriber has been installed
static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize the logger with configuration
///
/// Idempotent: a warm worker calling this again keeps the existing
/// subscriber. Returns `Ok(true)` only for the call that installed it; that
/// call also installs the panic hook.
pub fn init(config: &Config) -> io::Result<bool> {
    if INITIALIZED.get().is_some() {
        return Ok(false);
    }

    let (level, level_warning) = level_filter(config);
    let writer = writer::make_writer(config.logging.log_file.as_deref())?;

    let mut installed = false;
    INITIALIZED.get_or_init(|| {
        installed = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .event_format(GatewayFormat::new(&config.app.name))
            .with_writer(writer)
            .try_init()
            .is_ok();
    });

    if installed {
        if let Some(warning) = level_warning {
            log_warning(&warning);
        }
        install_panic_hook();
    }
    Ok(installed)
}

/// `logging.level` when set, else DEBUG in debug mode and ERROR otherwise
///
/// An unparsable level falls back to the default and comes back as a
/// warning to log once a subscriber exists.
fn level_filter(config: &Config) -> (LevelFilter, Option<String>) {
    let fallback = if config.app.debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::ERROR
    };
    match config.logging.level.as_deref() {
        None => (fallback, None),
        Some(level) => match level.parse() {
            Ok(filter) => (filter, None),
            Err(_) => (
                fallback,
                Some(format!("Unknown log level '{level}', using {fallback}")),
            ),
        },
    }
}

/// Send panic reports through the subscriber instead of bare stderr
///
/// A panic inside a route handler is already logged as that route's error
/// by the dispatcher, so the hook only records it at DEBUG.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        if dispatch::handler_running() {
            tracing::debug!("{info}");
        } else {
            tracing::error!("{info}");
        }
    }));
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("======================================");
    tracing::info!("{} local gateway started", config.app.name);
    tracing::info!("Listening on: http://{addr}");
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.log_file {
        tracing::info!("Log file: {path}");
    }
    tracing::info!("======================================");
}

pub fn log_route_registered(name: &str, pattern: &str, methods: &BTreeSet<String>) {
    let methods: Vec<&str> = methods.iter().map(String::as_str).collect();
    tracing::debug!("[Route] {name}: {} {pattern}", methods.join(","));
}

pub fn log_handler_error(route: &str, message: &str) {
    tracing::error!(route = %route, "{message}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!("{}", entry.format(format));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter_follows_debug_flag() {
        let mut config = Config::default();
        config.app.debug = true;
        assert_eq!(level_filter(&config), (LevelFilter::DEBUG, None));

        config.app.debug = false;
        assert_eq!(level_filter(&config), (LevelFilter::ERROR, None));
    }

    #[test]
    fn test_level_filter_explicit_level_wins() {
        let mut config = Config::default();
        config.logging.level = Some("warn".to_string());
        assert_eq!(level_filter(&config), (LevelFilter::WARN, None));
    }

    #[test]
    fn test_unknown_level_is_reported_after_fallback() {
        let mut config = Config::default();
        config.logging.level = Some("loud".to_string());
        config.app.debug = false;

        let (level, warning) = level_filter(&config);
        assert_eq!(level, LevelFilter::ERROR);
        let warning = warning.unwrap();
        assert!(warning.contains("'loud'"), "{warning}");
        assert!(warning.to_lowercase().contains("error"), "{warning}");
    }

    #[test]
    fn test_init_is_idempotent() {
        let config = Config::default();
        let first = init(&config).unwrap();
        let second = init(&config).unwrap();
        assert!(!second);
        // Only one call can ever install the subscriber
        assert!(!(first && second));
    }
}
