//! msfs-udp-client - SimVar polling client for the MSFS UDP bridge
//!
//! Without a subcommand it runs the airspeed demonstration loop against
//! `127.0.0.1:5005`, exactly as the bridge's reference client does.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod completion;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use msfs_simvar_requester::{Endpoint, RequesterConfig, TelemetryRequester};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{DemoArgs, GetArgs};
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "msfs-udp-client")]
#[command(about = "MSFS UDP Client - Poll SimVar values from the MSFS UDP bridge")]
#[command(version)]
#[command(long_about = "
msfs-udp-client requests SimVar values (AIRSPEED_INDICATED, G_FORCE, ...) from
the MSFS UDP bridge, a plain-text UDP server running next to Microsoft Flight
Simulator.

Run without a subcommand to start the airspeed demonstration loop.
Use --json with `get` for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// YAML requester config file
    #[arg(long, global = true, env = "MSFS_UDP_CONFIG")]
    config: Option<PathBuf>,

    /// Bridge IPv4 address (overrides the config file)
    #[arg(long, global = true)]
    address: Option<Ipv4Addr>,

    /// Bridge UDP port (overrides the config file)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Receive timeout in milliseconds (overrides the config file)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Send timeout in milliseconds (unbounded unless set)
    #[arg(long, global = true)]
    send_timeout_ms: Option<u64>,

    /// Ignore replies that do not come from the bridge address
    #[arg(long, global = true)]
    verify_origin: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll AIRSPEED_INDICATED in a loop (the default)
    Demo(DemoArgs),

    /// Request a single SimVar value
    Get(GetArgs),

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("msfs_udp_client={log_level},msfs_simvar_requester={log_level}").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let exit_code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(exit_code)
        }
    }
}

async fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        None => {
            let requester = TelemetryRequester::new(resolve_config(cli)?);
            commands::demo::execute(&requester, &DemoArgs::default()).await
        }
        Some(Commands::Demo(args)) => {
            let requester = TelemetryRequester::new(resolve_config(cli)?);
            commands::demo::execute(&requester, args).await
        }
        Some(Commands::Get(args)) => {
            let requester = TelemetryRequester::new(resolve_config(cli)?);
            commands::get::execute(&requester, args, cli.json).await
        }
        Some(Commands::Completion { shell }) => {
            completion::generate_completion(*shell);
            Ok(())
        }
    }
}

/// Layer command-line overrides on top of the config file (or defaults).
fn resolve_config(cli: &Cli) -> Result<RequesterConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => RequesterConfig::load(path)?,
        None => RequesterConfig::default(),
    };

    let endpoint = config.endpoint;
    config = config.with_endpoint(Endpoint::new(
        cli.address.unwrap_or(endpoint.address()),
        cli.port.unwrap_or(endpoint.port()),
    ));
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_receive_timeout(Duration::from_millis(timeout_ms));
    }
    if let Some(send_timeout_ms) = cli.send_timeout_ms {
        config = config.with_send_timeout(Some(Duration::from_millis(send_timeout_ms)));
    }
    if cli.verify_origin {
        config = config.with_reply_origin_check(true);
    }

    config
        .validate()
        .map_err(|e| CliError::InvalidConfiguration(e.to_string()))?;
    Ok(config)
}
