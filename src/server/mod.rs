// Local gateway server module
// Accepts HTTP connections and feeds them through the dispatcher like the hosting gateway would

pub mod adapter;
pub mod connection;
pub mod listener;

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::handler::Api;
use crate::logger;

// Re-export commonly used types
pub use listener::{bind, ListenOptions};

/// Accept loop; runs until the listener fails fatally
pub async fn run(listener: TcpListener, api: Arc<Api>, config: Arc<Config>) -> std::io::Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                connection::handle_connection(
                    stream,
                    peer_addr,
                    Arc::clone(&api),
                    Arc::clone(&config),
                );
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}
