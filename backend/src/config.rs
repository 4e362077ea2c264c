//! Server configuration.
//!
//! Values come from the environment (a `.env` file is loaded first when
//! present). The transformation core reads no configuration.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default upload limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Maximum accepted request body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Load from `TALLY_HOST`, `TALLY_PORT` and `TALLY_MAX_UPLOAD_MB`.
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = lookup("TALLY_HOST")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.host);
        let port = lookup("TALLY_PORT")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_upload_bytes = lookup("TALLY_MAX_UPLOAD_MB")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(defaults.max_upload_bytes);

        Self {
            host,
            port,
            max_upload_bytes,
        }
    }

    /// Override the port (CLI flag).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
