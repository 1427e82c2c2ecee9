// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Door state machine
//!
//! The door process owns a [`Door`] (its override latch) and an actuator
//! cell holding the physical [`DoorStatus`]. Each inbound command is turned
//! into a [`DoorPlan`] against a status snapshot taken under the actuator
//! guard; the network handler then carries the plan out.

use std::fmt;
use std::str::FromStr;

/// Physical door status held in the actuator cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorStatus {
    Closed,
    Opening,
    Open,
    Closing,
}

impl DoorStatus {
    pub fn is_transient(self) -> bool {
        matches!(self, DoorStatus::Opening | DoorStatus::Closing)
    }

    /// Terminal status a transient status settles into
    pub fn settles_to(self) -> Option<DoorStatus> {
        match self {
            DoorStatus::Opening => Some(DoorStatus::Open),
            DoorStatus::Closing => Some(DoorStatus::Closed),
            DoorStatus::Open | DoorStatus::Closed => None,
        }
    }
}

impl fmt::Display for DoorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DoorStatus::Closed => "closed",
            DoorStatus::Opening => "opening",
            DoorStatus::Open => "open",
            DoorStatus::Closing => "closing",
        };
        f.write_str(name)
    }
}

/// Commands a door accepts over TCP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorCommand {
    Open,
    Close,
    OpenEmergency,
    CloseSecure,
}

impl DoorCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoorCommand::Open => "OPEN",
            DoorCommand::Close => "CLOSE",
            DoorCommand::OpenEmergency => "OPEN_EMERG",
            DoorCommand::CloseSecure => "CLOSE_SECURE",
        }
    }
}

impl fmt::Display for DoorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DoorCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(DoorCommand::Open),
            "CLOSE" => Ok(DoorCommand::Close),
            "OPEN_EMERG" => Ok(DoorCommand::OpenEmergency),
            "CLOSE_SECURE" => Ok(DoorCommand::CloseSecure),
            _ => Err(()),
        }
    }
}

/// Responses a door sends back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorReply {
    Already,
    Opening,
    Opened,
    Closing,
    Closed,
    EmergencyMode,
    SecureMode,
}

impl DoorReply {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoorReply::Already => "ALREADY",
            DoorReply::Opening => "OPENING",
            DoorReply::Opened => "OPENED",
            DoorReply::Closing => "CLOSING",
            DoorReply::Closed => "CLOSED",
            DoorReply::EmergencyMode => "EMERGENCY_MODE",
            DoorReply::SecureMode => "SECURE_MODE",
        }
    }

    /// Whether this reply ends the exchange for a plain command
    pub fn is_final(&self) -> bool {
        !matches!(self, DoorReply::Opening | DoorReply::Closing)
    }

    /// Whether the overseer should hear about this reply out-of-band
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            DoorReply::Opened | DoorReply::Closed | DoorReply::EmergencyMode | DoorReply::SecureMode
        )
    }
}

impl fmt::Display for DoorReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DoorReply {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALREADY" => Ok(DoorReply::Already),
            "OPENING" => Ok(DoorReply::Opening),
            "OPENED" => Ok(DoorReply::Opened),
            "CLOSING" => Ok(DoorReply::Closing),
            "CLOSED" => Ok(DoorReply::Closed),
            "EMERGENCY_MODE" => Ok(DoorReply::EmergencyMode),
            "SECURE_MODE" => Ok(DoorReply::SecureMode),
            _ => Err(()),
        }
    }
}

/// Override modes; once engaged they last until the process restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Latch {
    /// Entered on fire; close commands are refused
    EmergencyOpen,
    /// Entered on security alarm; open commands are refused
    SecureClosed,
}

impl Latch {
    /// The command this latch refuses
    pub fn opposing(self) -> DoorCommand {
        match self {
            Latch::EmergencyOpen => DoorCommand::Close,
            Latch::SecureClosed => DoorCommand::Open,
        }
    }

    /// Reply sent whenever the latch refuses or confirms
    pub fn reply(self) -> DoorReply {
        match self {
            Latch::EmergencyOpen => DoorReply::EmergencyMode,
            Latch::SecureClosed => DoorReply::SecureMode,
        }
    }
}

/// What the network handler must do for one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorPlan {
    /// Answer without moving the door
    Reply(DoorReply),
    /// Announce, rendezvous with the actuator through `transient`, confirm
    Move {
        transient: DoorStatus,
        announce: DoorReply,
        confirm: DoorReply,
    },
    /// Engage an override, actuating first when `transient` is set
    Latch {
        latch: Latch,
        transient: Option<DoorStatus>,
    },
}

/// Door controller state owned by the door process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Door {
    latch: Option<Latch>,
}

impl Door {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently engaged override, if any
    pub fn latch(&self) -> Option<Latch> {
        self.latch
    }

    /// Decide how to serve `command` given the current physical status
    pub fn plan(&self, status: DoorStatus, command: DoorCommand) -> DoorPlan {
        if let Some(latch) = self.latch {
            if latch.opposing() == command {
                return DoorPlan::Reply(latch.reply());
            }
            // The first override wins; a second one only restates it
            if matches!(command, DoorCommand::OpenEmergency | DoorCommand::CloseSecure) {
                return DoorPlan::Reply(latch.reply());
            }
        }

        match command {
            DoorCommand::Open if status == DoorStatus::Open => DoorPlan::Reply(DoorReply::Already),
            DoorCommand::Open => DoorPlan::Move {
                transient: DoorStatus::Opening,
                announce: DoorReply::Opening,
                confirm: DoorReply::Opened,
            },
            DoorCommand::Close if status == DoorStatus::Closed => {
                DoorPlan::Reply(DoorReply::Already)
            }
            DoorCommand::Close => DoorPlan::Move {
                transient: DoorStatus::Closing,
                announce: DoorReply::Closing,
                confirm: DoorReply::Closed,
            },
            DoorCommand::OpenEmergency => DoorPlan::Latch {
                latch: Latch::EmergencyOpen,
                transient: (status != DoorStatus::Open).then_some(DoorStatus::Opening),
            },
            DoorCommand::CloseSecure => DoorPlan::Latch {
                latch: Latch::SecureClosed,
                transient: (status != DoorStatus::Closed).then_some(DoorStatus::Closing),
            },
        }
    }

    /// Engage an override. A latch already in place is kept.
    pub fn engage(&mut self, latch: Latch) -> Latch {
        *self.latch.get_or_insert(latch)
    }
}

#[cfg(test)]
#[path = "door_tests.rs"]
mod tests;
