//! The airspeed polling loop.
//!
//! Requests `AIRSPEED_INDICATED` once per iteration and prints it in knots.
//! From the seventh iteration on, `G_FORCE` is requested as well and its
//! value discarded. Failures never abort the loop.

use crate::commands::{AIRSPEED_VARIABLE, DemoArgs, G_FORCE_VARIABLE};
use crate::output::format_general;
use anyhow::Result;
use msfs_simvar_requester::TelemetryRequester;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, error};

/// Iterations after this index also request `G_FORCE`.
const G_FORCE_AFTER_ITERATION: u32 = 5;

const BANNER: &str = "MSFS UDP Client (Rust)";

/// Execute the demo loop, printing to stdout.
pub async fn execute(requester: &TelemetryRequester, args: &DemoArgs) -> Result<()> {
    let stdout = std::io::stdout();
    run(requester, args, &mut stdout.lock()).await
}

/// Execute the demo loop, writing result lines to `out`.
pub async fn run<W: Write>(
    requester: &TelemetryRequester,
    args: &DemoArgs,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "{BANNER}")?;
    writeln!(out, "{}", "=".repeat(BANNER.len()))?;
    out.flush()?;

    let interval = Duration::from_millis(args.interval_ms);

    for iteration in 0..args.iterations {
        let airspeed = requester.try_fetch_async(AIRSPEED_VARIABLE).await;

        if iteration > G_FORCE_AFTER_ITERATION {
            let g_force = requester.fetch_async(G_FORCE_VARIABLE).await;
            debug!(iteration, g_force, "G_FORCE sampled");
        }

        match airspeed {
            Ok(value) => writeln!(out, "Airspeed: {} knots", format_general(value))?,
            Err(e) => {
                error!(variable = AIRSPEED_VARIABLE, endpoint = %requester.endpoint(), "{e}");
                writeln!(out, "Failed to get airspeed")?;
            }
        }
        out.flush()?;

        tokio::time::sleep(interval).await;
    }

    Ok(())
}
