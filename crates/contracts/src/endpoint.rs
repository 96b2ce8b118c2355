//! EndpointAddr - transport addressing

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wildcard bind host
pub const WILDCARD_HOST: &str = "0.0.0.0";

/// `host:port` of a publish or subscribe endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointAddr {
    pub host: String,
    pub port: u16,
}

impl EndpointAddr {
    /// Create an address
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Bind address accepting connections from any interface
    pub fn wildcard(port: u16) -> Self {
        Self::new(WILDCARD_HOST, port)
    }
}

impl fmt::Display for EndpointAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
