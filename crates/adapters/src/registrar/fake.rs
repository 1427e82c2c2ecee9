// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake registrar for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::HashSet;
use std::net::SocketAddrV4;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Registrar, RegistrarError};

/// Recorded registrar call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrarCall {
    Register {
        peer: SocketAddrV4,
        door: SocketAddrV4,
    },
    RaiseFire {
        peer: SocketAddrV4,
    },
}

#[derive(Default)]
struct FakeRegistrarState {
    calls: Vec<RegistrarCall>,
    unconfirmed: HashSet<SocketAddrV4>,
}

/// Fake registrar for testing; confirms every door unless told otherwise
#[derive(Clone, Default)]
pub struct FakeRegistrar {
    inner: Arc<Mutex<FakeRegistrarState>>,
}

impl FakeRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<RegistrarCall> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }

    /// Doors announced to `peer`, in order
    pub fn registered_with(&self, peer: SocketAddrV4) -> Vec<SocketAddrV4> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RegistrarCall::Register { peer: to, door } if to == peer => Some(door),
                _ => None,
            })
            .collect()
    }

    /// Number of `FIRE` datagrams sent to `peer`
    pub fn fires_sent_to(&self, peer: SocketAddrV4) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == RegistrarCall::RaiseFire { peer })
            .count()
    }

    /// Never confirm `door`
    pub fn withhold_confirmation(&self, door: SocketAddrV4) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .unconfirmed
            .insert(door);
    }
}

#[async_trait]
impl Registrar for FakeRegistrar {
    async fn register(
        &self,
        peer: SocketAddrV4,
        door: SocketAddrV4,
    ) -> Result<bool, RegistrarError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.calls.push(RegistrarCall::Register { peer, door });
        Ok(!inner.unconfirmed.contains(&door))
    }

    async fn raise_fire(&self, peer: SocketAddrV4) -> Result<(), RegistrarError> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .push(RegistrarCall::RaiseFire { peer });
        Ok(())
    }
}
