//! One-shot SimVar request.

use crate::commands::GetArgs;
use crate::error::CliError;
use crate::output::{self, ReadingSummary};
use anyhow::Result;
use msfs_simvar_requester::TelemetryRequester;

/// Execute get command.
pub async fn execute(requester: &TelemetryRequester, args: &GetArgs, json: bool) -> Result<()> {
    let value = requester
        .try_fetch_async(&args.variable)
        .await
        .map_err(CliError::from)?;

    let summary = ReadingSummary {
        variable: &args.variable,
        endpoint: requester.endpoint().to_string(),
        value,
    };
    output::print_reading(&summary, json).map_err(CliError::from)?;
    Ok(())
}
