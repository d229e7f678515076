// Connection handling module
// Serves one TCP connection: each request becomes a gateway event dispatched on a blocking worker

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;

use crate::config::Config;
use crate::handler::Api;
use crate::logger::{self, AccessLogEntry};
use crate::server::adapter;

/// Handle a single connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Serves HTTP/1.1 requests with the gateway adapter
/// 3. Applies the configured connection timeout
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address, used in access logs
/// * `api` - The frozen route table
/// * `config` - Application configuration
pub fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    api: Arc<Api>,
    config: Arc<Config>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let timeout_duration = Duration::from_secs(config.server.connection_timeout);

        let service_config = Arc::clone(&config);
        let conn = http1::Builder::new().serve_connection(
            io,
            service_fn(move |req| {
                let api = Arc::clone(&api);
                let config = Arc::clone(&service_config);
                async move { handle_request(req, api, &config, peer_addr).await }
            }),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }
    });
}

/// Translate, dispatch and translate back one HTTP request
async fn handle_request(
    req: Request<hyper::body::Incoming>,
    api: Arc<Api>,
    config: &Config,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let event = adapter::to_event(req.method(), req.uri());

    let mut entry = AccessLogEntry::new(
        peer_addr.to_string(),
        event.http_method.clone(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);

    // Handlers may block on raster I/O
    let dispatched = tokio::task::spawn_blocking(move || {
        let (outbound, route) = api.dispatch_routed(&event);
        (outbound, route.map(ToString::to_string))
    })
    .await;

    let response = match dispatched {
        Ok((outbound, route)) => {
            entry.route = route;
            adapter::to_http_response(outbound)
        }
        Err(e) => {
            logger::log_error(&format!("Dispatch task failed: {e}"));
            adapter::internal_error("Dispatch task failed")
        }
    };

    if config.logging.access_log {
        entry.status = response.status().as_u16();
        let body_len = response.body().size_hint().exact().unwrap_or(0);
        entry.body_bytes = usize::try_from(body_len).unwrap_or(usize::MAX);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &config.logging.access_log_format);
    }

    Ok(response)
}
