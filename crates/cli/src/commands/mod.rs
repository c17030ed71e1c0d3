//! Command implementations for msfs-udp-client

pub mod demo;
pub mod get;

use clap::Args;

/// Variable polled by the demonstration loop.
pub const AIRSPEED_VARIABLE: &str = "AIRSPEED_INDICATED";

/// Variable additionally requested (and discarded) late in the loop.
pub const G_FORCE_VARIABLE: &str = "G_FORCE";

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct DemoArgs {
    /// Number of polling iterations
    #[arg(long, default_value_t = 10)]
    pub iterations: u32,

    /// Pause after each iteration, in milliseconds
    #[arg(long, default_value_t = 1_000)]
    pub interval_ms: u64,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            iterations: 10,
            interval_ms: 1_000,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct GetArgs {
    /// SimVar name, sent to the bridge as-is (e.g. AIRSPEED_INDICATED)
    pub variable: String,
}
