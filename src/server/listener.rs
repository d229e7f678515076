// Listener module
// Binds the local gateway socket with the options from the `[server]` table

use std::io;
use std::net::SocketAddr;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

use crate::config::ServerConfig;

/// Socket options for the local gateway listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenOptions {
    /// Pending connection queue length
    pub backlog: i32,
    /// `SO_REUSEPORT`: lets a second tiler process share the port during a redeploy
    pub reuse_port: bool,
}

impl ListenOptions {
    pub fn from_config(server: &ServerConfig) -> Self {
        Self {
            backlog: i32::try_from(server.backlog).unwrap_or(i32::MAX),
            reuse_port: server.reuse_port,
        }
    }
}

impl Default for ListenOptions {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

/// Bind a nonblocking listener on `addr`
///
/// Errors keep their `io::ErrorKind` and name the address and the step that
/// failed, e.g. `Failed to bind 127.0.0.1:8080: Address in use`.
pub fn bind(addr: SocketAddr, options: ListenOptions) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
        .map_err(|e| with_context(e, "create a socket for", addr))?;

    socket
        .set_reuse_port(options.reuse_port)
        .and_then(|()| socket.set_reuse_address(true))
        .map_err(|e| with_context(e, "set socket options for", addr))?;

    // Required before handing the socket to tokio
    socket
        .set_nonblocking(true)
        .map_err(|e| with_context(e, "set nonblocking mode for", addr))?;

    socket
        .bind(&addr.into())
        .map_err(|e| with_context(e, "bind", addr))?;
    socket
        .listen(options.backlog)
        .map_err(|e| with_context(e, "listen on", addr))?;

    TcpListener::from_std(socket.into())
}

fn with_context(err: io::Error, action: &str, addr: SocketAddr) -> io::Error {
    io::Error::new(err.kind(), format!("Failed to {action} {addr}: {err}"))
}
