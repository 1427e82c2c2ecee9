// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Actuation simulator

use std::time::Duration;

use kw_core::{ActuatorPort, DoorStatus};
use tracing::{error, info};

/// Where the motor leaves the door after moving through `transient`
pub(crate) fn motion_end(transient: DoorStatus) -> DoorStatus {
    match transient {
        DoorStatus::Opening | DoorStatus::Open => DoorStatus::Open,
        DoorStatus::Closing | DoorStatus::Closed => DoorStatus::Closed,
    }
}

/// Complete each issued request after `delay`; returns once every handle
/// is dropped
pub async fn simulate(mut port: ActuatorPort, delay: Duration) {
    while let Some(request) = port.next().await {
        let transient = request.transient();
        tokio::time::sleep(delay).await;
        let terminal = motion_end(transient);
        match request.complete(terminal) {
            Ok(()) => info!(%transient, %terminal, "actuated"),
            Err(e) => error!(%transient, %terminal, error = %e, "actuation rejected"),
        }
    }
}
