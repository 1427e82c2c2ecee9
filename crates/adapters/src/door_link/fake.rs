// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake door link for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddrV4;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kw_core::{DoorCommand, DoorReply};
use kw_wire::Message;

use super::{DoorLink, LinkError};

/// Recorded link call
#[derive(Debug, Clone, PartialEq)]
pub enum LinkCall {
    Command {
        door: SocketAddrV4,
        command: DoorCommand,
    },
    Notify {
        peer: SocketAddrV4,
        message: Message,
    },
}

#[derive(Default)]
struct FakeLinkState {
    calls: Vec<LinkCall>,
    scripted: HashMap<(SocketAddrV4, DoorCommand), Vec<DoorReply>>,
    unreachable: HashSet<SocketAddrV4>,
}

/// Fake door link for testing
///
/// Doors answer as an idle door would unless a reply sequence is scripted.
#[derive(Clone, Default)]
pub struct FakeDoorLink {
    inner: Arc<Mutex<FakeLinkState>>,
}

impl FakeDoorLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<LinkCall> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }

    /// Commands sent to `door`, in order
    pub fn commands_to(&self, door: SocketAddrV4) -> Vec<DoorCommand> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                LinkCall::Command { door: to, command } if to == door => Some(command),
                _ => None,
            })
            .collect()
    }

    /// Messages delivered to `peer`, in order
    pub fn notifications_to(&self, peer: SocketAddrV4) -> Vec<Message> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                LinkCall::Notify { peer: to, message } if to == peer => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Replace the replies `door` gives to `command`
    pub fn script(&self, door: SocketAddrV4, command: DoorCommand, replies: Vec<DoorReply>) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .scripted
            .insert((door, command), replies);
    }

    /// Make every call to `peer` fail to connect
    pub fn set_unreachable(&self, peer: SocketAddrV4) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .unreachable
            .insert(peer);
    }

    fn record(&self, peer: SocketAddrV4, call: LinkCall) -> Result<(), LinkError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.calls.push(call);
        if inner.unreachable.contains(&peer) {
            return Err(LinkError::Connect {
                peer,
                source: std::io::ErrorKind::ConnectionRefused.into(),
            });
        }
        Ok(())
    }
}

fn default_replies(command: DoorCommand) -> Vec<DoorReply> {
    match command {
        DoorCommand::Open => vec![DoorReply::Opening, DoorReply::Opened],
        DoorCommand::Close => vec![DoorReply::Closing, DoorReply::Closed],
        DoorCommand::OpenEmergency => vec![DoorReply::EmergencyMode],
        DoorCommand::CloseSecure => vec![DoorReply::SecureMode],
    }
}

#[async_trait]
impl DoorLink for FakeDoorLink {
    async fn command(
        &self,
        door: SocketAddrV4,
        command: DoorCommand,
    ) -> Result<Vec<DoorReply>, LinkError> {
        self.record(door, LinkCall::Command { door, command })?;
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner
            .scripted
            .get(&(door, command))
            .cloned()
            .unwrap_or_else(|| default_replies(command)))
    }

    async fn notify(&self, peer: SocketAddrV4, message: &Message) -> Result<(), LinkError> {
        self.record(
            peer,
            LinkCall::Notify {
                peer,
                message: message.clone(),
            },
        )
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
