// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! UDP registrar
//!
//! Each handshake runs on its own ephemeral socket, so the peer's `DREG`
//! (always sent back to the source address) reaches the waiting handshake
//! without passing through the daemon's receive loop.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use async_trait::async_trait;
use kw_core::{HandshakeEffect, HandshakeInput, PendingRegistration, MAX_ATTEMPTS};
use kw_wire::{Datagram, MAX_DATAGRAM_LEN};
use tokio::net::UdpSocket;
use tokio::time::Instant;

use super::{Registrar, RegistrarError};

#[derive(Debug, Clone)]
pub struct UdpRegistrar {
    resend_delay: Duration,
    max_attempts: u32,
}

impl UdpRegistrar {
    pub fn new(resend_delay: Duration) -> Self {
        Self {
            resend_delay,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

async fn ephemeral_socket() -> Result<UdpSocket, RegistrarError> {
    Ok(UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)).await?)
}

/// Wait for the next `DREG`; other traffic is skipped
async fn next_confirmation(socket: &UdpSocket) -> Result<SocketAddrV4, RegistrarError> {
    let mut buf = [0u8; MAX_DATAGRAM_LEN];
    loop {
        let (len, from) = socket.recv_from(&mut buf).await?;
        tracing::trace!(%from, len, "received datagram");
        match Datagram::decode(&buf[..len]) {
            Ok(Datagram::DoorRegistered(endpoint)) => return Ok(endpoint),
            Ok(other) => tracing::debug!(?other, "ignoring datagram while awaiting DREG"),
            Err(e) => tracing::debug!(error = %e, "dropping malformed datagram"),
        }
    }
}

#[async_trait]
impl Registrar for UdpRegistrar {
    async fn register(
        &self,
        peer: SocketAddrV4,
        door: SocketAddrV4,
    ) -> Result<bool, RegistrarError> {
        let socket = ephemeral_socket().await?;
        let payload = Datagram::Door(door).encode()?;

        let (mut pending, mut effects) = PendingRegistration::new(door)
            .with_max_attempts(self.max_attempts)
            .transition(HandshakeInput::Start);
        let mut deadline = Instant::now();

        loop {
            for effect in effects {
                match effect {
                    HandshakeEffect::Send { attempt, .. } => {
                        tracing::debug!(%peer, %door, attempt, "sending DOOR");
                        socket.send_to(&payload, peer).await?;
                        deadline = Instant::now() + self.resend_delay;
                    }
                    HandshakeEffect::Confirmed { .. } => return Ok(true),
                    HandshakeEffect::GiveUp { attempts, .. } => {
                        tracing::debug!(%peer, %door, attempts, "no DREG received");
                        return Ok(false);
                    }
                }
            }

            let input =
                match tokio::time::timeout_at(deadline, next_confirmation(&socket)).await {
                    Ok(confirmed) => HandshakeInput::Confirmation(confirmed?),
                    Err(_) => HandshakeInput::Timeout,
                };
            (pending, effects) = pending.transition(input);
        }
    }

    async fn raise_fire(&self, peer: SocketAddrV4) -> Result<(), RegistrarError> {
        let socket = ephemeral_socket().await?;
        let payload = Datagram::Fire.encode()?;
        socket.send_to(&payload, peer).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "udp_tests.rs"]
mod tests;
