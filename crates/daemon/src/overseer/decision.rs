// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Access decisions for scanned credentials

use kw_core::{DoorRecord, Registry};
use kw_storage::{AuthorizationTable, ConnectionTable};

/// Outcome of one scan. Computed per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Answer `ALLOWED#`, then cycle `door`
    Allow { door: DoorRecord },
    /// Answer `DENIED#`; tell `notify` when the reader's door is known
    Deny {
        reason: DenyReason,
        notify: Option<DoorRecord>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    UnknownCode,
    UnknownReader,
    NotAuthorized,
    DoorNotRegistered,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::UnknownCode => "unknown code",
            DenyReason::UnknownReader => "reader controls no door",
            DenyReason::NotAuthorized => "code not authorized for door",
            DenyReason::DoorNotRegistered => "door not registered",
        }
    }
}

/// Decide whether `code` scanned at `reader` opens the reader's door
pub fn decide(
    registry: &Registry,
    authorizations: &AuthorizationTable,
    connections: &ConnectionTable,
    reader: &str,
    code: &str,
) -> AccessDecision {
    let deny = |reason, notify| AccessDecision::Deny { reason, notify };

    if authorizations.doors_for(code).is_none() {
        return deny(DenyReason::UnknownCode, None);
    }
    let Some(door_id) = connections.door_for_reader(reader) else {
        return deny(DenyReason::UnknownReader, None);
    };
    let door = registry.door(door_id).cloned();

    if !authorizations.is_authorized(code, door_id) {
        return deny(DenyReason::NotAuthorized, door);
    }
    match door {
        Some(door) => AccessDecision::Allow { door },
        None => deny(DenyReason::DoorNotRegistered, None),
    }
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
