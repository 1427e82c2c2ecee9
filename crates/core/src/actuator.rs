// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Actuator sync cell shared by a door's network handler and its actuator
//!
//! The cell holds a single [`DoorStatus`]. The network side takes the
//! issuer guard, writes a transient status and blocks until the actuator
//! side completes it with the matching terminal status. Requests travel
//! over a bounded channel; each carries its own completion channel.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch, Mutex, MutexGuard};

use crate::door::DoorStatus;

/// Errors from the actuator cell
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActuatorError {
    #[error("cannot issue terminal status {0}; issue its transient status instead")]
    NotTransient(DoorStatus),
    #[error("{issued} cannot settle as {completed}")]
    Mismatch {
        issued: DoorStatus,
        completed: DoorStatus,
    },
    #[error("actuator side of the cell is gone")]
    Detached,
}

/// A pending actuation handed to the actuator side
#[derive(Debug)]
pub struct ActuatorRequest {
    transient: DoorStatus,
    done: oneshot::Sender<DoorStatus>,
    status: Arc<watch::Sender<DoorStatus>>,
}

impl ActuatorRequest {
    /// Transient status the door is moving through
    pub fn transient(&self) -> DoorStatus {
        self.transient
    }

    /// Publish the terminal status and wake the issuer.
    ///
    /// The status is published even when the issuer has gone away, so a
    /// dropped connection never leaves the door transient.
    pub fn complete(self, terminal: DoorStatus) -> Result<(), ActuatorError> {
        if self.transient.settles_to() != Some(terminal) {
            return Err(ActuatorError::Mismatch {
                issued: self.transient,
                completed: terminal,
            });
        }
        self.status.send_replace(terminal);
        let _ = self.done.send(terminal);
        Ok(())
    }
}

/// Network-facing side of the cell
#[derive(Clone)]
pub struct ActuatorHandle {
    status: Arc<watch::Sender<DoorStatus>>,
    issuer: Arc<Mutex<mpsc::Sender<ActuatorRequest>>>,
}

/// Actuator-facing side of the cell
pub struct ActuatorPort {
    requests: mpsc::Receiver<ActuatorRequest>,
}

/// Exclusive access to the cell for one command
pub struct ActuatorGuard<'a> {
    handle: &'a ActuatorHandle,
    requests: MutexGuard<'a, mpsc::Sender<ActuatorRequest>>,
}

/// Create a connected handle/port pair with the given initial status
pub fn actuator_cell(initial: DoorStatus) -> (ActuatorHandle, ActuatorPort) {
    let (status, _) = watch::channel(initial);
    let (tx, rx) = mpsc::channel(1);
    let handle = ActuatorHandle {
        status: Arc::new(status),
        issuer: Arc::new(Mutex::new(tx)),
    };
    (handle, ActuatorPort { requests: rx })
}

impl ActuatorHandle {
    /// Current status without taking the guard
    pub fn snapshot(&self) -> DoorStatus {
        *self.status.borrow()
    }

    /// Watch every status the cell publishes
    pub fn subscribe(&self) -> watch::Receiver<DoorStatus> {
        self.status.subscribe()
    }

    /// Take the issuer guard. Commands planned and issued under one guard
    /// cannot interleave with another connection's command.
    pub async fn lock(&self) -> ActuatorGuard<'_> {
        ActuatorGuard {
            handle: self,
            requests: self.issuer.lock().await,
        }
    }

    /// Take the guard and issue a single transient status
    pub async fn issue(&self, transient: DoorStatus) -> Result<DoorStatus, ActuatorError> {
        self.lock().await.issue(transient).await
    }
}

impl ActuatorGuard<'_> {
    /// Status as seen by the guard holder
    pub fn snapshot(&self) -> DoorStatus {
        self.handle.snapshot()
    }

    /// Write `transient`, wake the actuator and wait for the terminal status
    pub async fn issue(&mut self, transient: DoorStatus) -> Result<DoorStatus, ActuatorError> {
        if !transient.is_transient() {
            return Err(ActuatorError::NotTransient(transient));
        }

        self.handle.status.send_replace(transient);
        let (done, completed) = oneshot::channel();
        let request = ActuatorRequest {
            transient,
            done,
            status: Arc::clone(&self.handle.status),
        };
        self.requests
            .send(request)
            .await
            .map_err(|_| ActuatorError::Detached)?;
        completed.await.map_err(|_| ActuatorError::Detached)
    }
}

impl ActuatorPort {
    /// Wait for the next issued request; `None` once every handle is dropped
    pub async fn next(&mut self) -> Option<ActuatorRequest> {
        self.requests.recv().await
    }
}

#[cfg(test)]
#[path = "actuator_tests.rs"]
mod tests;
