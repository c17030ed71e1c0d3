//! The single request/response exchange with the SimVar UDP bridge.
//!
//! Every call binds its own ephemeral UDP socket, sends the variable name,
//! waits for one reply and drops the socket on the way out, whichever step
//! failed.

use crate::codec::{self, MAX_RESPONSE_LEN};
use crate::config::RequesterConfig;
use crate::endpoint::Endpoint;
use crate::error::RequestError;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Instant;
use tokio::net::UdpSocket as TokioUdpSocket;
use tracing::{debug, error, warn};

/// Value returned by the sentinel API when an exchange fails.
///
/// Indistinguishable from a genuine reading of `-1.0`; use
/// [`TelemetryRequester::try_fetch`] when that matters.
pub const FAILURE_SENTINEL: f64 = -1.0;

fn ephemeral_bind_addr() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))
}

fn reply_timed_out() -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, "no reply from server before timeout")
}

/// Requests SimVar values from one configured endpoint.
#[derive(Debug, Clone, Default)]
pub struct TelemetryRequester {
    config: RequesterConfig,
}

impl TelemetryRequester {
    pub fn new(config: RequesterConfig) -> Self {
        Self { config }
    }

    /// A requester for `endpoint` with every other setting at its default.
    pub fn for_endpoint(endpoint: Endpoint) -> Self {
        Self::new(RequesterConfig::default().with_endpoint(endpoint))
    }

    pub fn config(&self) -> &RequesterConfig {
        &self.config
    }

    pub fn endpoint(&self) -> Endpoint {
        self.config.endpoint
    }

    /// Request `variable_name` and parse the reply.
    ///
    /// Blocks for at most the receive timeout while waiting for the reply.
    /// The send step is only bounded when a send timeout is configured.
    ///
    /// # Errors
    ///
    /// - [`RequestError::Resource`] if the socket cannot be bound or configured
    /// - [`RequestError::Send`] if the datagram cannot be transmitted
    /// - [`RequestError::Receive`] on a receive error or timeout
    /// - [`RequestError::Parse`] if the reply is not a decimal number
    pub fn try_fetch(&self, variable_name: &str) -> Result<f64, RequestError> {
        let endpoint = self.config.endpoint;

        let socket = UdpSocket::bind(ephemeral_bind_addr()).map_err(RequestError::resource)?;
        socket
            .set_read_timeout(Some(self.config.receive_timeout()))
            .map_err(RequestError::resource)?;
        if let Some(send_timeout) = self.config.send_timeout() {
            socket
                .set_write_timeout(Some(send_timeout))
                .map_err(RequestError::resource)?;
        }

        socket
            .send_to(codec::encode_request(variable_name), endpoint.socket_addr())
            .map_err(RequestError::send)?;

        let mut buf = [0u8; MAX_RESPONSE_LEN];
        let len = self.receive_reply(&socket, &mut buf)?;
        let value = codec::decode_response(buf.get(..len).unwrap_or_default())?;

        debug!(variable = variable_name, %endpoint, value, "SimVar reply received");
        Ok(value)
    }

    /// Request `variable_name`, collapsing every failure to
    /// [`FAILURE_SENTINEL`] and logging a diagnostic.
    pub fn fetch(&self, variable_name: &str) -> f64 {
        match self.try_fetch(variable_name) {
            Ok(value) => value,
            Err(e) => {
                error!(variable = variable_name, endpoint = %self.config.endpoint, "{e}");
                FAILURE_SENTINEL
            }
        }
    }

    /// Async counterpart of [`Self::try_fetch`] for callers already running
    /// on a tokio runtime. Same timeouts, truncation and error mapping.
    ///
    /// # Errors
    ///
    /// Same as [`Self::try_fetch`].
    pub async fn try_fetch_async(&self, variable_name: &str) -> Result<f64, RequestError> {
        let endpoint = self.config.endpoint;

        let socket = TokioUdpSocket::bind(ephemeral_bind_addr())
            .await
            .map_err(RequestError::resource)?;

        let send = socket.send_to(codec::encode_request(variable_name), endpoint.socket_addr());
        match self.config.send_timeout() {
            Some(send_timeout) => match tokio::time::timeout(send_timeout, send).await {
                Ok(sent) => sent.map_err(RequestError::send)?,
                Err(_elapsed) => {
                    return Err(RequestError::send(io::Error::new(
                        io::ErrorKind::TimedOut,
                        "send did not complete before timeout",
                    )));
                }
            },
            None => send.await.map_err(RequestError::send)?,
        };

        let deadline = tokio::time::Instant::now() + self.config.receive_timeout();
        let mut buf = [0u8; MAX_RESPONSE_LEN];
        let len = loop {
            let (len, peer) =
                match tokio::time::timeout_at(deadline, socket.recv_from(&mut buf)).await {
                    Ok(received) => received.map_err(RequestError::receive)?,
                    Err(_elapsed) => return Err(RequestError::receive(reply_timed_out())),
                };
            if self.accepts_reply_from(peer) {
                break len;
            }
        };

        let value = codec::decode_response(buf.get(..len).unwrap_or_default())?;
        debug!(variable = variable_name, %endpoint, value, "SimVar reply received");
        Ok(value)
    }

    /// Sentinel form of [`Self::try_fetch_async`].
    pub async fn fetch_async(&self, variable_name: &str) -> f64 {
        match self.try_fetch_async(variable_name).await {
            Ok(value) => value,
            Err(e) => {
                error!(variable = variable_name, endpoint = %self.config.endpoint, "{e}");
                FAILURE_SENTINEL
            }
        }
    }

    /// Wait for the reply, skipping foreign senders when origin checks are on.
    /// All attempts share one deadline.
    fn receive_reply(&self, socket: &UdpSocket, buf: &mut [u8]) -> Result<usize, RequestError> {
        let deadline = Instant::now() + self.config.receive_timeout();
        loop {
            let (len, peer) = socket.recv_from(buf).map_err(RequestError::receive)?;
            if self.accepts_reply_from(peer) {
                return Ok(len);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(RequestError::receive(reply_timed_out()));
            }
            socket
                .set_read_timeout(Some(remaining))
                .map_err(RequestError::receive)?;
        }
    }

    fn accepts_reply_from(&self, peer: SocketAddr) -> bool {
        if !self.config.verify_reply_origin || self.config.endpoint.matches(peer) {
            return true;
        }
        warn!(%peer, expected = %self.config.endpoint, "Discarding reply from unexpected sender");
        false
    }
}

/// Request `variable_name` from the default endpoint (`127.0.0.1:5005`).
///
/// Returns [`FAILURE_SENTINEL`] on any failure after logging a diagnostic.
pub fn fetch(variable_name: &str) -> f64 {
    TelemetryRequester::default().fetch(variable_name)
}

/// Request `variable_name` from `server_address:server_port`.
///
/// `server_address` must be a dotted-quad IPv4 address. Returns
/// [`FAILURE_SENTINEL`] on any failure after logging a diagnostic.
pub fn fetch_from(variable_name: &str, server_address: &str, server_port: u16) -> f64 {
    match Endpoint::parse(server_address, server_port) {
        Ok(endpoint) => TelemetryRequester::for_endpoint(endpoint).fetch(variable_name),
        Err(e) => {
            error!(variable = variable_name, "{e}");
            FAILURE_SENTINEL
        }
    }
}
