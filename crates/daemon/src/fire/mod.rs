// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fire-detection unit daemon

mod state;

pub use state::{FireAction, FireState};

use std::net::SocketAddrV4;
use std::sync::{Arc, Mutex};

use kw_adapters::{DoorLink, Registrar};
use kw_core::{Clock, DoorCommand, FireUnitConfig};
use kw_wire::{Datagram, Message, MAX_DATAGRAM_LEN};
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::lifecycle::{bind_udp, LifecycleError};

/// A running fire unit
pub struct FireUnit<L, R, C> {
    config: FireUnitConfig,
    socket: UdpSocket,
    local_addr: SocketAddrV4,
    state: Arc<Mutex<FireState>>,
    link: L,
    registrar: R,
    clock: C,
}

impl<L: DoorLink, R: Registrar, C: Clock> FireUnit<L, R, C> {
    /// Bind the UDP endpoint, say hello to the overseer and start
    /// confirming the configured doors with it
    pub async fn start(
        config: FireUnitConfig,
        link: L,
        registrar: R,
        clock: C,
    ) -> Result<Self, LifecycleError> {
        let (socket, local_addr) = bind_udp(config.bind).await?;
        let state = Arc::new(Mutex::new(FireState::new(
            config.temp_threshold,
            config.detection_period,
            config.min_detections,
        )));

        let unit = Self {
            config,
            socket,
            local_addr,
            state,
            link,
            registrar,
            clock,
        };

        let hello = Message::FireAlarmHello {
            endpoint: local_addr,
        };
        if let Err(e) = unit.link.notify(unit.config.overseer, &hello).await {
            warn!(
                overseer = %unit.config.overseer,
                error = %e,
                "overseer did not receive fire unit hello"
            );
        }

        for door in unit.config.known_doors.clone() {
            unit.confirm_known_door(door);
        }

        Ok(unit)
    }

    pub fn local_addr(&self) -> SocketAddrV4 {
        self.local_addr
    }

    /// Watch the alarm flag
    pub fn alarm(&self) -> watch::Receiver<bool> {
        self.lock_state().subscribe()
    }

    /// Current forwarding list
    pub fn doors(&self) -> Vec<SocketAddrV4> {
        self.lock_state().doors().to_vec()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, FireState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Ask the overseer to vouch for `door`; it joins the forwarding list
    /// only once confirmed
    fn confirm_known_door(&self, door: SocketAddrV4) {
        let registrar = self.registrar.clone();
        let link = self.link.clone();
        let state = Arc::clone(&self.state);
        let overseer = self.config.overseer;
        tokio::spawn(async move {
            match registrar.register(overseer, door).await {
                Ok(true) => {
                    let actions = state
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .add_door(door);
                    for action in actions {
                        if let FireAction::OpenDoors(doors) = action {
                            open_doors(&link, doors);
                        }
                    }
                }
                Ok(false) => warn!(%door, "overseer did not confirm door, omitting"),
                Err(e) => error!(%door, error = %e, "door confirmation failed"),
            }
        });
    }

    /// Receive datagrams until the task is dropped
    pub async fn run(&self) {
        let mut buf = [0u8; MAX_DATAGRAM_LEN];
        loop {
            let (len, from) = match self.socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) => {
                    error!(error = %e, "receive failed");
                    continue;
                }
            };
            let datagram = match Datagram::decode(&buf[..len]) {
                Ok(datagram) => datagram,
                Err(e) => {
                    debug!(%from, error = %e, "dropping malformed datagram");
                    continue;
                }
            };

            let now = self.clock.now_micros();
            let actions = self.lock_state().on_datagram(datagram, from, now);
            self.execute(actions).await;
        }
    }

    async fn execute(&self, actions: Vec<FireAction>) {
        for action in actions {
            match action {
                FireAction::Confirm { to, door } => {
                    let reply = Datagram::DoorRegistered(door);
                    let sent = match reply.encode() {
                        Ok(bytes) => self.socket.send_to(&bytes, to).await.map(|_| ()),
                        Err(e) => {
                            error!(error = %e, "failed to encode DREG");
                            continue;
                        }
                    };
                    match sent {
                        Ok(()) => debug!(%to, %door, "sent DREG"),
                        Err(e) => warn!(%to, %door, error = %e, "failed to send DREG"),
                    }
                }
                FireAction::OpenDoors(doors) => {
                    info!(doors = doors.len(), "opening doors");
                    open_doors(&self.link, doors);
                }
            }
        }
    }
}

/// Send `OPEN_EMERG#` to each door independently, without waiting
fn open_doors<L: DoorLink>(link: &L, doors: Vec<SocketAddrV4>) {
    for door in doors {
        let link = link.clone();
        tokio::spawn(async move {
            let message = Message::Command(DoorCommand::OpenEmergency);
            if let Err(e) = link.notify(door, &message).await {
                error!(%door, error = %e, "emergency open not delivered");
            }
        });
    }
}

#[cfg(test)]
#[path = "fire_tests.rs"]
mod tests;
