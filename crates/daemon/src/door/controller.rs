// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Door command execution against the actuator cell

use std::sync::Mutex;

use kw_core::{
    ActuatorError, ActuatorHandle, Door, DoorCommand, DoorPlan, DoorReply, DoorStatus, Latch,
};
use tokio::sync::mpsc;
use tracing::debug;

/// Serializes commands for one door.
///
/// The status snapshot, the plan and the actuation all happen under the
/// actuator guard, so two connections can never both decide to open.
pub struct DoorController {
    actuator: ActuatorHandle,
    door: Mutex<Door>,
}

impl DoorController {
    pub fn new(actuator: ActuatorHandle) -> Self {
        Self {
            actuator,
            door: Mutex::new(Door::new()),
        }
    }

    pub fn status(&self) -> DoorStatus {
        self.actuator.snapshot()
    }

    pub fn latch(&self) -> Option<Latch> {
        self.door.lock().unwrap_or_else(|e| e.into_inner()).latch()
    }

    /// Run `command` to completion, sending each reply to `replies` as soon
    /// as it is known.
    ///
    /// A closed `replies` receiver does not abort the command: once an
    /// actuation has been issued it always completes.
    pub async fn execute(
        &self,
        command: DoorCommand,
        replies: mpsc::UnboundedSender<DoorReply>,
    ) -> Result<(), ActuatorError> {
        let mut guard = self.actuator.lock().await;
        let status = guard.snapshot();
        let plan = self
            .door
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .plan(status, command);
        debug!(%command, %status, ?plan, "planned");

        match plan {
            DoorPlan::Reply(reply) => {
                let _ = replies.send(reply);
            }
            DoorPlan::Move {
                transient,
                announce,
                confirm,
            } => {
                let _ = replies.send(announce);
                guard.issue(transient).await?;
                let _ = replies.send(confirm);
            }
            DoorPlan::Latch { latch, transient } => {
                let engaged = self
                    .door
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .engage(latch);
                if let Some(transient) = transient {
                    guard.issue(transient).await?;
                }
                let _ = replies.send(engaged.reply());
            }
        }
        Ok(())
    }

    /// Run `command` and collect every reply
    pub async fn run(&self, command: DoorCommand) -> Result<Vec<DoorReply>, ActuatorError> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.execute(command, tx).await?;
        let mut replies = Vec::new();
        while let Some(reply) = rx.recv().await {
            replies.push(reply);
        }
        Ok(replies)
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
