// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! UDP door registration and fire alarm datagrams

mod udp;

pub use udp::UdpRegistrar;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRegistrar, RegistrarCall};

use std::net::SocketAddrV4;

use async_trait::async_trait;
use kw_wire::CodecError;
use thiserror::Error;

/// Errors from registrar operations
#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Sends registration and alarm datagrams to a peer's UDP endpoint
#[async_trait]
pub trait Registrar: Clone + Send + Sync + 'static {
    /// Announce `door` to `peer`, resending until a matching `DREG`
    /// arrives or the attempts run out.
    ///
    /// Returns whether the peer confirmed.
    async fn register(&self, peer: SocketAddrV4, door: SocketAddrV4)
        -> Result<bool, RegistrarError>;

    /// Send one `FIRE` datagram
    async fn raise_fire(&self, peer: SocketAddrV4) -> Result<(), RegistrarError>;
}
