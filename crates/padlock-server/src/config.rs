//! Server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use padlock_core::SessionConfig;
use padlock_proto::{DEFAULT_PORT, MAX_LINE_LENGTH};

/// Listener and session settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind: IpAddr,
    /// TCP port; 0 picks a free port
    pub port: u16,
    /// Longest accepted command line, excluding the terminator
    pub max_line_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            max_line_length: MAX_LINE_LENGTH,
        }
    }
}

impl ServerConfig {
    /// Listen address.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Per-session settings derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig { max_line_length: self.max_line_length }
    }
}
