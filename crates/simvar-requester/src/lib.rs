//! Request/response client for the MSFS SimVar UDP bridge.
//!
//! The bridge answers a datagram containing a SimVar name (for example
//! `AIRSPEED_INDICATED`) with a datagram containing the value as decimal
//! text. This crate performs that exchange, one ephemeral socket per call.
//!
//! # Protocol
//!
//! - Transport: IPv4 UDP, default endpoint `127.0.0.1:5005`
//! - Request: raw UTF-8 bytes of the variable name, no framing
//! - Reply: decimal text, at most 1023 bytes are considered
//! - The reply must arrive within the receive timeout (1 s by default)
//!
//! # Usage
//!
//! ```rust,no_run
//! use msfs_simvar_requester::{RequestError, TelemetryRequester};
//!
//! # fn main() -> Result<(), RequestError> {
//! let requester = TelemetryRequester::default();
//! let airspeed = requester.try_fetch("AIRSPEED_INDICATED")?;
//! println!("Airspeed: {airspeed} knots");
//!
//! // Sentinel form: -1.0 on failure, diagnostic logged through `tracing`.
//! let g_force = msfs_simvar_requester::fetch("G_FORCE");
//! # let _ = g_force;
//! # Ok(())
//! # }
//! ```

#![deny(static_mut_refs)]

pub mod codec;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod requester;

pub use codec::{MAX_RESPONSE_LEN, RECEIVE_BUFFER_LEN, decode_response, encode_request};
pub use config::{DEFAULT_RECEIVE_TIMEOUT_MS, RequesterConfig};
pub use endpoint::{DEFAULT_SERVER_ADDRESS, DEFAULT_SERVER_PORT, Endpoint};
pub use error::{ConfigError, RequestError, RequestErrorKind, TransportStage};
pub use requester::{FAILURE_SENTINEL, TelemetryRequester, fetch, fetch_from};
