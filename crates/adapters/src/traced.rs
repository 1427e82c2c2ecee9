// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use std::net::SocketAddrV4;

use async_trait::async_trait;
use kw_core::{DoorCommand, DoorReply};
use kw_wire::Message;
use tracing::Instrument;

use crate::door_link::{DoorLink, LinkError};
use crate::registrar::{Registrar, RegistrarError};

/// Wrapper that adds tracing to any DoorLink
#[derive(Clone)]
pub struct TracedDoorLink<L> {
    inner: L,
}

impl<L> TracedDoorLink<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<L: DoorLink> DoorLink for TracedDoorLink<L> {
    async fn command(
        &self,
        door: SocketAddrV4,
        command: DoorCommand,
    ) -> Result<Vec<DoorReply>, LinkError> {
        let span = tracing::info_span!("link.command", %door, %command);
        async {
            tracing::debug!("sending");
            let start = std::time::Instant::now();
            let result = self.inner.command(door, command).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(replies) => tracing::info!(
                    replies = ?replies,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "door answered"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "command failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn notify(&self, peer: SocketAddrV4, message: &Message) -> Result<(), LinkError> {
        let span = tracing::info_span!("link.notify", %peer, %message);
        async {
            let result = self.inner.notify(peer, message).await;
            // Notifications are best-effort; the peer may simply be down
            match &result {
                Ok(()) => tracing::debug!("delivered"),
                Err(e) => tracing::warn!(error = %e, "delivery failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any Registrar
#[derive(Clone)]
pub struct TracedRegistrar<R> {
    inner: R,
}

impl<R> TracedRegistrar<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: Registrar> Registrar for TracedRegistrar<R> {
    async fn register(
        &self,
        peer: SocketAddrV4,
        door: SocketAddrV4,
    ) -> Result<bool, RegistrarError> {
        let span = tracing::info_span!("registrar.register", %peer, %door);
        async {
            tracing::info!("starting handshake");
            let start = std::time::Instant::now();
            let result = self.inner.register(peer, door).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(true) => tracing::info!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "registration confirmed"
                ),
                Ok(false) => tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "registration unconfirmed, door omitted"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "handshake failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn raise_fire(&self, peer: SocketAddrV4) -> Result<(), RegistrarError> {
        let result = self.inner.raise_fire(peer).await;
        match &result {
            Ok(()) => tracing::info!(%peer, "FIRE sent"),
            Err(e) => tracing::error!(%peer, error = %e, "FIRE send failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
