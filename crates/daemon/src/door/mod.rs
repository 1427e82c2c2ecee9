// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Door controller daemon

mod actuator;
mod controller;
mod handler;

pub use controller::DoorController;

use std::net::SocketAddrV4;
use std::sync::Arc;

use kw_adapters::DoorLink;
use kw_core::{actuator_cell, DoorConfig, DoorStatus};
use kw_wire::Message;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::lifecycle::{bind_tcp, LifecycleError};

/// State shared by every connection to one door
pub(crate) struct DoorContext<L> {
    pub(crate) config: DoorConfig,
    pub(crate) controller: DoorController,
    pub(crate) link: L,
}

/// A running door: listener, controller and actuation simulator
pub struct DoorDaemon<L> {
    listener: TcpListener,
    local_addr: SocketAddrV4,
    ctx: Arc<DoorContext<L>>,
    simulator: JoinHandle<()>,
}

impl<L: DoorLink> DoorDaemon<L> {
    /// Bind the listener, start the simulator and announce the door to the
    /// overseer. The door starts closed.
    pub async fn start(config: DoorConfig, link: L) -> Result<Self, LifecycleError> {
        let (listener, local_addr) = bind_tcp(config.bind).await?;

        let (handle, port) = actuator_cell(DoorStatus::Closed);
        let simulator = tokio::spawn(actuator::simulate(port, config.actuation_delay));

        let hello = Message::DoorHello {
            id: config.id.clone(),
            endpoint: local_addr,
            mode: config.mode,
        };
        if let Err(e) = link.notify(config.overseer, &hello).await {
            warn!(overseer = %config.overseer, error = %e, "overseer did not receive door hello");
        }

        Ok(Self {
            listener,
            local_addr,
            ctx: Arc::new(DoorContext {
                config,
                controller: DoorController::new(handle),
                link,
            }),
            simulator,
        })
    }

    pub fn id(&self) -> &str {
        &self.ctx.config.id
    }

    pub fn local_addr(&self) -> SocketAddrV4 {
        self.local_addr
    }

    pub fn controller(&self) -> &DoorController {
        &self.ctx.controller
    }

    /// Accept connections until the task is dropped
    pub async fn run(&self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(door_id = %self.id(), %peer, "accepted connection");
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        if let Err(e) = handler::handle_connection(ctx, stream).await {
                            warn!(%peer, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => error!(door_id = %self.id(), error = %e, "accept failed"),
            }
        }
    }
}

impl<L> Drop for DoorDaemon<L> {
    fn drop(&mut self) {
        self.simulator.abort();
        info!(door_id = %self.ctx.config.id, "door stopped");
    }
}

#[cfg(test)]
#[path = "door_tests.rs"]
mod tests;
