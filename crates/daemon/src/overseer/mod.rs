// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Overseer daemon: device registry, access decisions and manual control
//!
//! The overseer listens for `#`-terminated messages on a TCP port and for
//! datagrams on the UDP port with the same number.

mod control;
mod datagram;
mod decision;
mod server;
mod state;

pub use control::{ControlCommand, ControlError};
pub use decision::{decide, AccessDecision, DenyReason};
pub use state::{DoorView, OverseerState};

use std::net::SocketAddrV4;
use std::sync::{Arc, Mutex, MutexGuard};

use kw_adapters::{DoorLink, Registrar};
use kw_core::OverseerConfig;
use kw_storage::{AuthorizationTable, ConnectionTable};
use kw_wire::MAX_DATAGRAM_LEN;
use tokio::net::{TcpListener, UdpSocket};
use tracing::{debug, error, info, warn};

use crate::lifecycle::{bind_tcp, bind_udp, LifecycleError};

/// State shared by every overseer task
pub(crate) struct OverseerContext<L, R> {
    pub(crate) config: OverseerConfig,
    state: Mutex<OverseerState>,
    pub(crate) authorizations: AuthorizationTable,
    pub(crate) connections: ConnectionTable,
    pub(crate) link: L,
    pub(crate) registrar: R,
}

impl<L, R> OverseerContext<L, R> {
    pub(crate) fn lock(&self) -> MutexGuard<'_, OverseerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<L: DoorLink, R: Registrar> OverseerContext<L, R> {
    /// Run the registration handshake for `door` with `unit` in the background
    pub(crate) fn push_door(&self, unit: SocketAddrV4, door: SocketAddrV4) {
        let registrar = self.registrar.clone();
        tokio::spawn(async move {
            match registrar.register(unit, door).await {
                Ok(true) => debug!(%unit, %door, "fire unit confirmed door"),
                Ok(false) => warn!(%unit, %door, "fire unit never confirmed door"),
                Err(e) => error!(%unit, %door, error = %e, "door push failed"),
            }
        });
    }
}

/// A running overseer
pub struct Overseer<L, R> {
    listener: TcpListener,
    socket: UdpSocket,
    local_addr: SocketAddrV4,
    ctx: Arc<OverseerContext<L, R>>,
}

impl<L: DoorLink, R: Registrar> Overseer<L, R> {
    /// Load both tables and bind the TCP and UDP endpoints
    pub async fn start(
        config: OverseerConfig,
        link: L,
        registrar: R,
    ) -> Result<Self, LifecycleError> {
        let authorizations = AuthorizationTable::load(&config.authorization_file)?;
        let connections = ConnectionTable::load(&config.connections_file)?;
        info!(
            credentials = authorizations.len(),
            readers = connections.len(),
            "tables loaded"
        );

        let (listener, local_addr) = bind_tcp(config.bind).await?;
        let (socket, _) = bind_udp(local_addr).await?;

        Ok(Self {
            listener,
            socket,
            local_addr,
            ctx: Arc::new(OverseerContext {
                state: Mutex::new(OverseerState::new(config.limits)),
                config,
                authorizations,
                connections,
                link,
                registrar,
            }),
        })
    }

    pub fn local_addr(&self) -> SocketAddrV4 {
        self.local_addr
    }

    /// Run `f` against the current state
    pub fn inspect<T>(&self, f: impl FnOnce(&OverseerState) -> T) -> T {
        f(&self.ctx.lock())
    }

    /// Execute one console command and return its output
    pub async fn control(&self, command: ControlCommand) -> String {
        control::execute(&self.ctx, command).await
    }

    /// Serve TCP connections and datagrams until the task is dropped
    pub async fn run(&self) {
        let mut buf = [0u8; MAX_DATAGRAM_LEN];
        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "accepted connection");
                        let ctx = Arc::clone(&self.ctx);
                        tokio::spawn(async move {
                            if let Err(e) = server::handle_connection(ctx, stream).await {
                                debug!(%peer, error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => error!(error = %e, "accept failed"),
                },
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok((len, from)) => {
                        let datagram = &buf[..len];
                        datagram::handle_datagram(&self.ctx, &self.socket, datagram, from).await;
                    }
                    Err(e) => error!(error = %e, "receive failed"),
                },
            }
        }
    }
}

#[cfg(test)]
#[path = "overseer_tests.rs"]
mod tests;
