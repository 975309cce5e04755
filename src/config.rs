//! Client configuration: where the server lives and how long to wait on it.

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use crate::wire::ClientError;

/// Server address used when none is given.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Server port used when none is given.
pub const DEFAULT_PORT: u16 = 3000;

/// Connection settings shared by every session of one run.
///
/// Timeouts default to `None`: a connect, read or write then blocks until the
/// peer answers or closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: None,
            read_timeout: None,
            write_timeout: None,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Bound both reads and writes.
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self.write_timeout = Some(timeout);
        self
    }

    /// Resolve `host:port` to the first socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ClientError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| ClientError::Connection(e.to_string()))?
            .next()
            .ok_or_else(|| ClientError::Connection("Invalid server address".into()))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl From<SocketAddr> for ClientConfig {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port())
    }
}
