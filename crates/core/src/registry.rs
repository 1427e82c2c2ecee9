// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Overseer device registry
//!
//! Keyed tables of doors, card readers and fire units with upsert-by-id
//! semantics and a fixed capacity per kind.

use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddrV4;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::device::{CardReaderRecord, DoorRecord, FailureMode, FireUnitRecord};

/// Kind of registered device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Door,
    CardReader,
    FireUnit,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceKind::Door => "door",
            DeviceKind::CardReader => "card reader",
            DeviceKind::FireUnit => "fire unit",
        };
        f.write_str(name)
    }
}

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{kind} registry full ({capacity} entries)")]
    Full { kind: DeviceKind, capacity: usize },
}

/// Outcome of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

/// Capacity per device kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryLimits {
    pub doors: usize,
    pub card_readers: usize,
    pub fire_units: usize,
}

impl Default for RegistryLimits {
    fn default() -> Self {
        Self {
            doors: 50,
            card_readers: 50,
            fire_units: 50,
        }
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    limits: RegistryLimits,
    doors: BTreeMap<String, DoorRecord>,
    card_readers: BTreeMap<String, CardReaderRecord>,
    fire_units: BTreeMap<String, FireUnitRecord>,
}

/// Insert or replace `value` under `key`, refusing new keys past `capacity`
fn upsert<V>(
    table: &mut BTreeMap<String, V>,
    key: String,
    value: V,
    kind: DeviceKind,
    capacity: usize,
) -> Result<Upsert, RegistryError> {
    if let Some(existing) = table.get_mut(&key) {
        *existing = value;
        return Ok(Upsert::Updated);
    }
    if table.len() >= capacity {
        return Err(RegistryError::Full { kind, capacity });
    }
    table.insert(key, value);
    Ok(Upsert::Inserted)
}

impl Registry {
    pub fn new(limits: RegistryLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn upsert_door(&mut self, door: DoorRecord) -> Result<Upsert, RegistryError> {
        upsert(
            &mut self.doors,
            door.id.clone(),
            door,
            DeviceKind::Door,
            self.limits.doors,
        )
    }

    pub fn upsert_card_reader(
        &mut self,
        reader: CardReaderRecord,
    ) -> Result<Upsert, RegistryError> {
        upsert(
            &mut self.card_readers,
            reader.id.clone(),
            reader,
            DeviceKind::CardReader,
            self.limits.card_readers,
        )
    }

    pub fn upsert_fire_unit(&mut self, unit: FireUnitRecord) -> Result<Upsert, RegistryError> {
        upsert(
            &mut self.fire_units,
            unit.id(),
            unit,
            DeviceKind::FireUnit,
            self.limits.fire_units,
        )
    }

    pub fn door(&self, id: &str) -> Option<&DoorRecord> {
        self.doors.get(id)
    }

    /// Door registered at `endpoint`, if any
    pub fn door_at(&self, endpoint: SocketAddrV4) -> Option<&DoorRecord> {
        self.doors.values().find(|d| d.endpoint == endpoint)
    }

    /// All doors ordered by id
    pub fn doors(&self) -> impl Iterator<Item = &DoorRecord> {
        self.doors.values()
    }

    /// Snapshot of every door with the given failure mode
    pub fn doors_with_mode(&self, mode: FailureMode) -> Vec<DoorRecord> {
        self.doors
            .values()
            .filter(|d| d.mode == mode)
            .cloned()
            .collect()
    }

    /// Snapshot of every registered fire unit
    pub fn fire_units(&self) -> Vec<FireUnitRecord> {
        self.fire_units.values().cloned().collect()
    }

    pub fn count(&self, kind: DeviceKind) -> usize {
        match kind {
            DeviceKind::Door => self.doors.len(),
            DeviceKind::CardReader => self.card_readers.len(),
            DeviceKind::FireUnit => self.fire_units.len(),
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
