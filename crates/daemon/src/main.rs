// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keyward device daemon (kwd)
//!
//! Runs one overseer, one door, one fire unit, or a whole site from a TOML
//! configuration file.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kw_core::{DoorConfig, FireUnitConfig, OverseerConfig, SiteConfig};
use kw_daemon::lifecycle::{
    startup_door, startup_fire_unit, startup_overseer, DaemonOverseer, LifecycleError,
};
use kw_daemon::{ControlCommand, Site};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

const USAGE: &str = "usage: kwd <overseer|door|firealarm|site> <config.toml>";

/// Startup marker prefix written to the log before anything else.
/// Full format: "--- kwd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- kwd: starting (pid: ";

enum Role {
    Overseer,
    Door,
    FireUnit,
    Site,
}

impl Role {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "overseer" => Some(Role::Overseer),
            "door" => Some(Role::Door),
            "firealarm" => Some(Role::FireUnit),
            "site" => Some(Role::Site),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let (role, config_path) = match args.as_slice() {
        [_, role, path] => match Role::parse(role) {
            Some(role) => (role, PathBuf::from(path)),
            None => return Err(USAGE.into()),
        },
        _ => return Err(USAGE.into()),
    };

    match role {
        Role::Overseer => {
            let config = OverseerConfig::from_file(&config_path)?;
            let _guard = setup_logging(config.log_path.as_deref())?;
            let overseer = startup_overseer(config).await.map_err(startup_failed)?;
            let overseer = Arc::new(overseer);
            ready();
            serve_overseer(overseer).await?;
        }
        Role::Door => {
            let config = DoorConfig::from_file(&config_path)?;
            let _guard = setup_logging(config.log_path.as_deref())?;
            let door = startup_door(config).await.map_err(startup_failed)?;
            ready();
            until_signal(door.run()).await?;
        }
        Role::FireUnit => {
            let config = FireUnitConfig::from_file(&config_path)?;
            let _guard = setup_logging(config.log_path.as_deref())?;
            let unit = startup_fire_unit(config).await.map_err(startup_failed)?;
            ready();
            until_signal(unit.run()).await?;
        }
        Role::Site => {
            let config = SiteConfig::from_file(&config_path)?;
            let _guard = setup_logging(config.log_path.as_deref())?;
            let mut site = Site::start(config).await.map_err(startup_failed)?;
            ready();
            let overseer = Arc::clone(&site.overseer);
            tokio::select! {
                _ = site.run() => {}
                result = console(overseer) => result?,
            }
        }
    }

    info!("daemon stopped");
    Ok(())
}

fn startup_failed(e: LifecycleError) -> Box<dyn std::error::Error> {
    error!("Failed to start daemon: {}", e);
    e.into()
}

/// Signal readiness to a waiting parent process
fn ready() {
    info!("daemon ready");
    println!("READY");
}

/// Drive `daemon` until it ends or a termination signal arrives
async fn until_signal(daemon: impl std::future::Future<Output = ()>) -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = daemon => {}
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
    }
    Ok(())
}

async fn serve_overseer(overseer: Arc<DaemonOverseer>) -> std::io::Result<()> {
    let runner = Arc::clone(&overseer);
    tokio::select! {
        result = until_signal(async move { runner.run().await }) => result,
        result = console(overseer) => result,
    }
}

/// Read console commands from stdin until signalled. Stdin reaching EOF
/// leaves the daemon running.
async fn console(overseer: Arc<DaemonOverseer>) -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut lines: Option<Lines<BufReader<Stdin>>> =
        Some(BufReader::new(tokio::io::stdin()).lines());

    loop {
        tokio::select! {
            line = next_line(&mut lines) => match line {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => match line.parse::<ControlCommand>() {
                    Ok(command) => println!("{}", overseer.control(command).await),
                    Err(e) => println!("{}", e),
                },
                None => lines = None,
            },
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                return Ok(());
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                return Ok(());
            }
        }
    }
}

/// Next stdin line; pends forever once stdin is closed
async fn next_line(lines: &mut Option<Lines<BufReader<Stdin>>>) -> Option<String> {
    match lines {
        Some(lines) => lines.next_line().await.ok().flatten(),
        None => std::future::pending().await,
    }
}

fn setup_logging(
    log_path: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(log_path) = log_path else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
        return Ok(None);
    };

    write_startup_marker(log_path)?;

    let directory = log_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .ok_or_else(|| std::io::Error::other(format!("no file name in {}", log_path.display())))?;
    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(Some(guard))
}

/// Append the startup marker to the log file, creating its directory
fn write_startup_marker(log_path: &Path) -> Result<(), LifecycleError> {
    use std::io::Write;

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}
