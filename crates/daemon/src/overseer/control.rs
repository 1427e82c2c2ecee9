// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manual control surface: line-oriented console commands

use std::fmt::Write as _;
use std::str::FromStr;

use kw_adapters::{DoorLink, Registrar};
use kw_core::{DeviceKind, DoorCommand, DoorReply};
use thiserror::Error;
use tracing::{info, warn};

use super::OverseerContext;

pub const HELP: &str = "\
DOOR LIST           list registered doors
DOOR OPEN <id>      open a door
DOOR CLOSE <id>     close a door
FIRE ALARM          send FIRE to every fire unit
SECURITY ALARM      close every fail-secure door
TEMP LIST           latest reading per sensor
STATUS              registry counts and alarm flag
HELP                this text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    DoorList,
    DoorOpen(String),
    DoorClose(String),
    FireAlarm,
    SecurityAlarm,
    TempList,
    Status,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("invalid command: {0} (try HELP)")]
    Invalid(String),
}

impl FromStr for ControlCommand {
    type Err = ControlError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let command = match tokens.as_slice() {
            ["DOOR", "LIST"] => ControlCommand::DoorList,
            ["DOOR", "OPEN", id] => ControlCommand::DoorOpen(id.to_string()),
            ["DOOR", "CLOSE", id] => ControlCommand::DoorClose(id.to_string()),
            ["FIRE", "ALARM"] => ControlCommand::FireAlarm,
            ["SECURITY", "ALARM"] => ControlCommand::SecurityAlarm,
            ["TEMP", "LIST"] => ControlCommand::TempList,
            ["STATUS"] => ControlCommand::Status,
            ["HELP"] => ControlCommand::Help,
            _ => return Err(ControlError::Invalid(line.trim().to_string())),
        };
        Ok(command)
    }
}

fn render_replies(replies: &[DoorReply]) -> String {
    replies
        .iter()
        .map(|r| format!("{}#", r))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) async fn execute<L: DoorLink, R: Registrar>(
    ctx: &OverseerContext<L, R>,
    command: ControlCommand,
) -> String {
    info!(?command, "console command");
    match command {
        ControlCommand::DoorList => door_list(ctx),
        ControlCommand::DoorOpen(id) => door_command(ctx, &id, DoorCommand::Open).await,
        ControlCommand::DoorClose(id) => door_command(ctx, &id, DoorCommand::Close).await,
        ControlCommand::FireAlarm => fire_alarm(ctx).await,
        ControlCommand::SecurityAlarm => security_alarm(ctx).await,
        ControlCommand::TempList => temp_list(ctx),
        ControlCommand::Status => status(ctx),
        ControlCommand::Help => HELP.to_string(),
    }
}

fn door_list<L, R>(ctx: &OverseerContext<L, R>) -> String {
    let doors = ctx.lock().doors();
    let mut out = String::from("ID\tENDPOINT\tMODE\tLAST");
    for door in doors {
        let last = door
            .last_report
            .map_or_else(|| "-".to_string(), |r| r.to_string());
        let _ = write!(
            out,
            "\n{}\t{}\t{}\t{}",
            door.record.id, door.record.endpoint, door.record.mode, last
        );
    }
    out
}

async fn door_command<L: DoorLink, R: Registrar>(
    ctx: &OverseerContext<L, R>,
    id: &str,
    command: DoorCommand,
) -> String {
    let Some(door) = ctx.lock().door(id) else {
        return format!("unknown door {}", id);
    };
    match ctx.link.command(door.endpoint, command).await {
        Ok(replies) => format!("door {}: {}", id, render_replies(&replies)),
        Err(e) => {
            warn!(door_id = %id, %command, error = %e, "console command failed");
            format!("door {}: {}", id, e)
        }
    }
}

/// Send `FIRE` to every unit, repeated with the resend delay in between
async fn fire_alarm<L: DoorLink, R: Registrar>(ctx: &OverseerContext<L, R>) -> String {
    let units = ctx.lock().fire_unit_endpoints();
    if units.is_empty() {
        return "no fire unit registered".to_string();
    }

    let repeats = ctx.config.fire_alarm_repeats.max(1);
    let mut failures = 0;
    for round in 0..repeats {
        if round > 0 {
            tokio::time::sleep(ctx.config.datagram_resend_delay).await;
        }
        for unit in &units {
            if let Err(e) = ctx.registrar.raise_fire(*unit).await {
                warn!(%unit, error = %e, "FIRE not sent");
                failures += 1;
            }
        }
    }
    format!(
        "FIRE sent {} time(s) to {} unit(s), {} failed",
        repeats,
        units.len(),
        failures
    )
}

async fn security_alarm<L: DoorLink, R: Registrar>(ctx: &OverseerContext<L, R>) -> String {
    let doors = ctx.lock().raise_security_alarm();
    warn!(doors = doors.len(), "security alarm raised");

    let mut out = format!("security alarm raised, {} fail-secure door(s)", doors.len());
    for door in doors {
        let outcome = match ctx.link.command(door.endpoint, DoorCommand::CloseSecure).await {
            Ok(replies) => render_replies(&replies),
            Err(e) => {
                warn!(door_id = %door.id, error = %e, "CLOSE_SECURE not delivered");
                e.to_string()
            }
        };
        let _ = write!(out, "\ndoor {}: {}", door.id, outcome);
    }
    out
}

fn temp_list<L, R>(ctx: &OverseerContext<L, R>) -> String {
    let state = ctx.lock();
    let mut out = String::from("SENSOR\tTEMP\tRECORDED_AT_US");
    for reading in state.temps() {
        let _ = write!(
            out,
            "\n{}\t{:.1}\t{}",
            reading.sensor_id, reading.temperature, reading.recorded_at
        );
    }
    out
}

fn status<L, R>(ctx: &OverseerContext<L, R>) -> String {
    let state = ctx.lock();
    format!(
        "doors: {}\ncard readers: {}\nfire units: {}\nsecurity alarm: {}",
        state.count(DeviceKind::Door),
        state.count(DeviceKind::CardReader),
        state.count(DeviceKind::FireUnit),
        if state.security_alarm() { "on" } else { "off" },
    )
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
