// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kw door <addr> <action>` - Send a command straight to a door

use std::fmt;
use std::net::SocketAddrV4;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, ValueEnum};
use kw_core::DoorCommand;
use serde::Serialize;

use crate::client::Client;
use crate::output::{print, OutputFormat};

#[derive(Args)]
pub struct DoorArgs {
    /// Door endpoint (addr:port)
    pub door: SocketAddrV4,

    /// Command to send
    #[arg(value_enum)]
    pub action: DoorAction,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DoorAction {
    /// OPEN#
    Open,
    /// CLOSE#
    Close,
    /// OPEN_EMERG#
    Emergency,
    /// CLOSE_SECURE#
    Secure,
}

impl From<DoorAction> for DoorCommand {
    fn from(action: DoorAction) -> Self {
        match action {
            DoorAction::Open => DoorCommand::Open,
            DoorAction::Close => DoorCommand::Close,
            DoorAction::Emergency => DoorCommand::OpenEmergency,
            DoorAction::Secure => DoorCommand::CloseSecure,
        }
    }
}

#[derive(Serialize)]
struct DoorOutcome {
    door: String,
    command: String,
    replies: Vec<String>,
}

impl fmt::Display for DoorOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, reply) in self.replies.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", reply)?;
        }
        Ok(())
    }
}

pub async fn door(args: DoorArgs, timeout: Duration, format: OutputFormat) -> Result<()> {
    let command = DoorCommand::from(args.action);
    let replies = Client::new(args.door, timeout).door(command).await?;
    print(
        &DoorOutcome {
            door: args.door.to_string(),
            command: command.to_string(),
            replies: replies.iter().map(|r| r.to_string()).collect(),
        },
        format,
    );
    Ok(())
}
