//! Server endpoint addressing.

use crate::error::RequestError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;

/// Default server address of the SimVar UDP bridge.
pub const DEFAULT_SERVER_ADDRESS: Ipv4Addr = Ipv4Addr::LOCALHOST;

/// Default server port of the SimVar UDP bridge.
pub const DEFAULT_SERVER_PORT: u16 = 5005;

/// IPv4 address and port of the SimVar UDP bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    address: Ipv4Addr,
    port: u16,
}

impl Endpoint {
    pub const fn new(address: Ipv4Addr, port: u16) -> Self {
        Self { address, port }
    }

    /// Build an endpoint from a dotted-quad address string and a port.
    pub fn parse(address: &str, port: u16) -> Result<Self, RequestError> {
        let ip = address
            .trim()
            .parse::<Ipv4Addr>()
            .map_err(|e| RequestError::invalid_endpoint(address, e))?;
        Ok(Self::new(ip, port))
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.address, self.port))
    }

    /// Whether a datagram from `peer` originates from this endpoint.
    pub fn matches(&self, peer: SocketAddr) -> bool {
        peer == self.socket_addr()
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_ADDRESS, DEFAULT_SERVER_PORT)
    }
}

impl From<SocketAddrV4> for Endpoint {
    fn from(addr: SocketAddrV4) -> Self {
        Self::new(*addr.ip(), addr.port())
    }
}

impl From<Endpoint> for SocketAddr {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.socket_addr()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = RequestError;

    /// Parse `"a.b.c.d:port"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<SocketAddrV4>()
            .map(Self::from)
            .map_err(|e| RequestError::invalid_endpoint(s, e))
    }
}

impl Serialize for Endpoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Endpoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
