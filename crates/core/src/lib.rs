// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kw-core: Core library for the keyward access-control installation
//!
//! This crate provides:
//! - Device records and the overseer's keyed registry
//! - The door state machine and the actuator sync cell it drives
//! - The fire unit's sliding detection window
//! - The per-door registration handshake state machine
//! - Daemon configuration structs

pub mod clock;
pub mod config;

pub mod actuator;
pub mod device;
pub mod door;
pub mod handshake;
pub mod registry;
pub mod window;

// Re-exports
pub use actuator::{
    actuator_cell, ActuatorError, ActuatorGuard, ActuatorHandle, ActuatorPort, ActuatorRequest,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, DoorConfig, FireUnitConfig, OverseerConfig, SiteConfig};
pub use device::{CardReaderRecord, DoorRecord, FailureMode, FireUnitRecord, ParseModeError};
pub use door::{Door, DoorCommand, DoorPlan, DoorReply, DoorStatus, Latch};
pub use handshake::{HandshakeEffect, HandshakeInput, PendingRegistration, MAX_ATTEMPTS};
pub use registry::{DeviceKind, Registry, RegistryError, RegistryLimits, Upsert};
pub use window::DetectionWindow;
