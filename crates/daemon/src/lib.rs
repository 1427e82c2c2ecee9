// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kw-daemon: the keyward device daemons
//!
//! - [`door`]: one door controller and its actuation simulator
//! - [`fire`]: the fire-detection unit
//! - [`overseer`]: registry, access decisions and the manual control surface
//! - [`supervisor`]: a whole site in one process

pub mod door;
pub mod fire;
pub mod lifecycle;
pub mod overseer;
pub mod supervisor;

pub use door::{DoorController, DoorDaemon};
pub use fire::{FireAction, FireState, FireUnit};
pub use lifecycle::LifecycleError;
pub use overseer::{ControlCommand, Overseer};
pub use supervisor::Site;
