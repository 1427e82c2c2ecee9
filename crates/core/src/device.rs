// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Device records held by the overseer's registry

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddrV4;
use std::str::FromStr;
use thiserror::Error;

/// How a door behaves when an emergency is raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureMode {
    /// Unlocks automatically on fire detection
    #[serde(rename = "FAIL_SAFE")]
    FailSafe,
    /// Stays locked through fire; closes on a security alarm
    #[serde(rename = "FAIL_SECURE")]
    FailSecure,
}

impl FailureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureMode::FailSafe => "FAIL_SAFE",
            FailureMode::FailSecure => "FAIL_SECURE",
        }
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown failure mode: {0}")]
pub struct ParseModeError(pub String);

impl FromStr for FailureMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FAIL_SAFE" => Ok(FailureMode::FailSafe),
            "FAIL_SECURE" => Ok(FailureMode::FailSecure),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

/// A registered door controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorRecord {
    pub id: String,
    pub endpoint: SocketAddrV4,
    pub mode: FailureMode,
}

impl DoorRecord {
    pub fn new(id: impl Into<String>, endpoint: SocketAddrV4, mode: FailureMode) -> Self {
        Self {
            id: id.into(),
            endpoint,
            mode,
        }
    }

    pub fn is_fail_safe(&self) -> bool {
        self.mode == FailureMode::FailSafe
    }
}

/// A registered card reader
///
/// Readers only ever connect to the overseer, so no endpoint is tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardReaderRecord {
    pub id: String,
}

impl CardReaderRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A registered fire-detection unit, identified by its UDP endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireUnitRecord {
    pub endpoint: SocketAddrV4,
}

impl FireUnitRecord {
    pub fn new(endpoint: SocketAddrV4) -> Self {
        Self { endpoint }
    }

    /// Registry key for this unit
    pub fn id(&self) -> String {
        self.endpoint.to_string()
    }
}
