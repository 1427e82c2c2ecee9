// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration
//!
//! Each daemon is started from an explicit configuration struct, usually
//! read from a TOML file. Durations use humantime syntax (`"250ms"`).

use std::net::SocketAddrV4;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::device::FailureMode;
use crate::registry::RegistryLimits;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn default_door_open_duration() -> Duration {
    Duration::from_secs(2)
}

fn default_resend_delay() -> Duration {
    Duration::from_millis(100)
}

fn default_actuation_delay() -> Duration {
    Duration::from_millis(100)
}

fn default_io_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_fire_alarm_repeats() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

/// Overseer daemon configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverseerConfig {
    /// TCP and UDP endpoint (both bound on the same port)
    pub bind: SocketAddrV4,
    /// How long a door stays open after an allowed scan
    #[serde(with = "humantime_serde", default = "default_door_open_duration")]
    pub door_open_duration: Duration,
    /// Wait for a `DREG` before resending, and spacing of `FIRE` repeats
    #[serde(with = "humantime_serde", default = "default_resend_delay")]
    pub datagram_resend_delay: Duration,
    /// Number of `FIRE` datagrams sent per manual fire alarm
    #[serde(default = "default_fire_alarm_repeats")]
    pub fire_alarm_repeats: u32,
    /// Credential to door authorization table
    pub authorization_file: PathBuf,
    /// Card reader to door connection table
    pub connections_file: PathBuf,
    #[serde(default)]
    pub limits: RegistryLimits,
    /// Timeout for each read or write on a connection
    #[serde(with = "humantime_serde", default = "default_io_timeout")]
    pub io_timeout: Duration,
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

/// Door controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorConfig {
    pub id: String,
    pub bind: SocketAddrV4,
    pub mode: FailureMode,
    pub overseer: SocketAddrV4,
    /// Simulated time for the door to open or close
    #[serde(with = "humantime_serde", default = "default_actuation_delay")]
    pub actuation_delay: Duration,
    /// Send terminal replies to the overseer as well as the caller
    #[serde(default = "default_true")]
    pub report_to_overseer: bool,
    #[serde(with = "humantime_serde", default = "default_io_timeout")]
    pub io_timeout: Duration,
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

/// Fire-detection unit configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireUnitConfig {
    /// UDP endpoint; also announced to the overseer
    pub bind: SocketAddrV4,
    /// Readings at or above this temperature count as detections
    pub temp_threshold: f32,
    pub min_detections: usize,
    #[serde(with = "humantime_serde")]
    pub detection_period: Duration,
    pub overseer: SocketAddrV4,
    #[serde(with = "humantime_serde", default = "default_resend_delay")]
    pub resend_delay: Duration,
    /// Door endpoints to confirm with the overseer at startup
    #[serde(default)]
    pub known_doors: Vec<SocketAddrV4>,
    #[serde(with = "humantime_serde", default = "default_io_timeout")]
    pub io_timeout: Duration,
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

/// A whole installation, started by the supervisor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub overseer: OverseerConfig,
    #[serde(default)]
    pub doors: Vec<DoorConfig>,
    #[serde(default)]
    pub fire_unit: Option<FireUnitConfig>,
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

/// Read and parse a TOML config file
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl OverseerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        load(path)
    }
}

impl DoorConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = load(path)?;
        if config.id.is_empty() || config.id.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid(format!(
                "door id must be a single non-empty token: {:?}",
                config.id
            )));
        }
        Ok(config)
    }
}

impl FireUnitConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        load(path)
    }
}

impl SiteConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        load(path)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
