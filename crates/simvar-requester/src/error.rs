//! Error types for the SimVar request/response exchange.
//!
//! Every failure of a single exchange maps onto one [`RequestError`] variant.
//! The `Display` text of each variant is the diagnostic line emitted by the
//! sentinel-returning API, so it stays stable.

use std::io;

/// The step of the exchange a transport failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportStage {
    /// Transmitting the request datagram.
    Send,
    /// Waiting for the reply datagram (includes the receive timeout).
    Receive,
}

/// Coarse classification of a [`RequestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestErrorKind {
    /// The socket could not be created or configured.
    Resource,
    /// Send or receive failed at the network layer.
    Transport,
    /// The reply was not a decimal number.
    Parse,
    /// The server address was not a dotted-quad IPv4 address.
    InvalidEndpoint,
}

/// Failure of a single SimVar exchange.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Socket acquisition (or timeout configuration) failed.
    #[error("Error creating socket: {source}")]
    Resource {
        #[source]
        source: io::Error,
    },

    /// Sending the request failed.
    #[error("Error sending request: {source}")]
    Send {
        #[source]
        source: io::Error,
    },

    /// Receiving the reply failed. Timeouts land here too.
    #[error("Error receiving response (timeout or connection issue): {source}")]
    Receive {
        #[source]
        source: io::Error,
    },

    /// The reply payload could not be parsed as a number.
    #[error("Error parsing response: {payload}")]
    Parse { payload: String },

    /// The configured server address is not a valid IPv4 address.
    #[error("Invalid server address '{address}': {reason}")]
    InvalidEndpoint { address: String, reason: String },
}

impl RequestError {
    /// Classify this error.
    pub fn kind(&self) -> RequestErrorKind {
        match self {
            RequestError::Resource { .. } => RequestErrorKind::Resource,
            RequestError::Send { .. } | RequestError::Receive { .. } => {
                RequestErrorKind::Transport
            }
            RequestError::Parse { .. } => RequestErrorKind::Parse,
            RequestError::InvalidEndpoint { .. } => RequestErrorKind::InvalidEndpoint,
        }
    }

    /// For transport failures, the step that failed.
    pub fn transport_stage(&self) -> Option<TransportStage> {
        match self {
            RequestError::Send { .. } => Some(TransportStage::Send),
            RequestError::Receive { .. } => Some(TransportStage::Receive),
            _ => None,
        }
    }

    /// Whether the failure was the receive (or send) timeout expiring.
    ///
    /// Platforms disagree on the error kind: Unix reports `WouldBlock`,
    /// Windows reports `TimedOut`. Both are treated as a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            RequestError::Send { source } | RequestError::Receive { source } => matches!(
                source.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }

    pub(crate) fn resource(source: io::Error) -> Self {
        RequestError::Resource { source }
    }

    pub(crate) fn send(source: io::Error) -> Self {
        RequestError::Send { source }
    }

    pub(crate) fn receive(source: io::Error) -> Self {
        RequestError::Receive { source }
    }

    pub(crate) fn parse(payload: impl Into<String>) -> Self {
        RequestError::Parse {
            payload: payload.into(),
        }
    }

    pub(crate) fn invalid_endpoint(address: impl Into<String>, reason: impl ToString) -> Self {
        RequestError::InvalidEndpoint {
            address: address.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors raised while loading a [`crate::RequesterConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let timeout = RequestError::receive(io::Error::from(io::ErrorKind::WouldBlock));
        assert_eq!(timeout.kind(), RequestErrorKind::Transport);
        assert_eq!(timeout.transport_stage(), Some(TransportStage::Receive));

        let send = RequestError::send(io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(send.kind(), RequestErrorKind::Transport);
        assert_eq!(send.transport_stage(), Some(TransportStage::Send));

        let parse = RequestError::parse("abc");
        assert_eq!(parse.kind(), RequestErrorKind::Parse);
        assert_eq!(parse.transport_stage(), None);

        let resource = RequestError::resource(io::Error::from(io::ErrorKind::AddrInUse));
        assert_eq!(resource.kind(), RequestErrorKind::Resource);
    }

    #[test]
    fn test_timeout_detection() {
        assert!(RequestError::receive(io::Error::from(io::ErrorKind::WouldBlock)).is_timeout());
        assert!(RequestError::receive(io::Error::from(io::ErrorKind::TimedOut)).is_timeout());
        assert!(
            !RequestError::receive(io::Error::from(io::ErrorKind::ConnectionRefused)).is_timeout()
        );
        assert!(!RequestError::parse("1.0x").is_timeout());
    }

    #[test]
    fn test_parse_message_includes_payload() {
        let err = RequestError::parse("NOT_A_NUMBER");
        assert_eq!(err.to_string(), "Error parsing response: NOT_A_NUMBER");
    }
}
