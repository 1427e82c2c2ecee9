// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kw - Keyward operator CLI
//!
//! Speaks the device protocols for manual testing: scans, card reader
//! hellos, door commands, fire and temperature datagrams.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod completions;
mod error;
mod output;

use std::net::SocketAddrV4;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{door, fire, hello, scan, temp};
use completions::CompletionsArgs;

use crate::client::Client;
use crate::error::KwError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "kw",
    version,
    about = "Keyward - access-control device tooling"
)]
struct Cli {
    /// Overseer endpoint
    #[arg(long, global = true, env = "KW_OVERSEER", default_value = "127.0.0.1:3000")]
    overseer: SocketAddrV4,

    /// Network timeout (e.g. 500ms, 5s)
    #[arg(long, global = true, default_value = "5s", value_parser = humantime::parse_duration)]
    timeout: Duration,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Present a credential at a card reader
    Scan(scan::ScanArgs),
    /// Register a card reader with the overseer
    Hello(hello::HelloArgs),
    /// Send a command straight to a door
    Door(door::DoorArgs),
    /// Send a FIRE datagram to a fire unit
    Fire(fire::FireArgs),
    /// Relay a temperature reading
    Temp(temp::TempArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let overseer = Client::new(cli.overseer, cli.timeout);

    match cli.command {
        Commands::Scan(args) => scan::scan(args, &overseer, cli.format).await,
        Commands::Hello(args) => hello::hello(args, &overseer).await,
        Commands::Door(args) => door::door(args, cli.timeout, cli.format).await,
        Commands::Fire(args) => fire::fire(args).await,
        Commands::Temp(args) => temp::temp(args).await,
        Commands::Completions(args) => {
            completions::generate_completions::<Cli>(args.shell);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match KwError::explain(&e) {
                Some(explained) => eprint!("{}", explained),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}
