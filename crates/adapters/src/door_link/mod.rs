// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound TCP exchanges with doors and the overseer

mod tcp;

pub use tcp::TcpDoorLink;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeDoorLink, LinkCall};

use std::net::SocketAddrV4;

use async_trait::async_trait;
use kw_core::{DoorCommand, DoorReply};
use kw_wire::{Message, ProtocolError};
use thiserror::Error;

/// Errors from link operations
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("failed to connect to {peer}: {source}")]
    Connect {
        peer: SocketAddrV4,
        #[source]
        source: std::io::Error,
    },
    #[error("connect to {0} timed out")]
    ConnectTimeout(SocketAddrV4),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("unexpected message: {0}")]
    Unexpected(Message),
}

/// One-request-per-connection TCP exchanges
#[async_trait]
pub trait DoorLink: Clone + Send + Sync + 'static {
    /// Send a command to a door and collect its replies up to the first
    /// final reply, or until the door closes the connection
    async fn command(
        &self,
        door: SocketAddrV4,
        command: DoorCommand,
    ) -> Result<Vec<DoorReply>, LinkError>;

    /// Deliver a message without waiting for a response
    async fn notify(&self, peer: SocketAddrV4, message: &Message) -> Result<(), LinkError>;
}
