// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Overseer state behind the single registry lock

use std::collections::BTreeMap;
use std::net::SocketAddrV4;

use kw_core::{
    CardReaderRecord, DeviceKind, DoorRecord, DoorReply, FailureMode, FireUnitRecord, Registry,
    RegistryError, RegistryLimits, Upsert,
};
use kw_wire::TempReading;

/// A door as shown by `DOOR LIST`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorView {
    pub record: DoorRecord,
    pub last_report: Option<DoorReply>,
}

#[derive(Debug)]
pub struct OverseerState {
    registry: Registry,
    reports: BTreeMap<String, DoorReply>,
    temps: BTreeMap<u16, TempReading>,
    security_alarm: bool,
}

impl OverseerState {
    pub fn new(limits: RegistryLimits) -> Self {
        Self {
            registry: Registry::new(limits),
            reports: BTreeMap::new(),
            temps: BTreeMap::new(),
            security_alarm: false,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Upsert a door. Returns the fire units a fail-safe door must be
    /// pushed to.
    pub fn register_door(
        &mut self,
        door: DoorRecord,
    ) -> Result<(Upsert, Vec<SocketAddrV4>), RegistryError> {
        let push = door.is_fail_safe();
        let upsert = self.registry.upsert_door(door)?;
        let units = if push {
            self.fire_unit_endpoints()
        } else {
            Vec::new()
        };
        Ok((upsert, units))
    }

    pub fn register_card_reader(&mut self, id: &str) -> Result<Upsert, RegistryError> {
        self.registry.upsert_card_reader(CardReaderRecord::new(id))
    }

    /// Upsert a fire unit. Returns every fail-safe door to push to it.
    pub fn register_fire_unit(
        &mut self,
        endpoint: SocketAddrV4,
    ) -> Result<(Upsert, Vec<SocketAddrV4>), RegistryError> {
        let upsert = self
            .registry
            .upsert_fire_unit(FireUnitRecord::new(endpoint))?;
        let doors = self
            .registry
            .doors_with_mode(FailureMode::FailSafe)
            .into_iter()
            .map(|d| d.endpoint)
            .collect();
        Ok((upsert, doors))
    }

    pub fn fire_unit_endpoints(&self) -> Vec<SocketAddrV4> {
        self.registry
            .fire_units()
            .into_iter()
            .map(|u| u.endpoint)
            .collect()
    }

    /// Whether a `DOOR` datagram for `endpoint` deserves a `DREG`
    pub fn vouches_for(&self, endpoint: SocketAddrV4) -> bool {
        self.registry
            .door_at(endpoint)
            .is_some_and(DoorRecord::is_fail_safe)
    }

    pub fn record_report(&mut self, id: &str, reply: DoorReply) {
        self.reports.insert(id.to_string(), reply);
    }

    /// Keep the newest reading per sensor. Returns whether `reading` was kept.
    pub fn record_temp(&mut self, reading: TempReading) -> bool {
        match self.temps.get(&reading.sensor_id) {
            Some(current) if current.recorded_at >= reading.recorded_at => false,
            _ => {
                self.temps.insert(reading.sensor_id, reading);
                true
            }
        }
    }

    /// Latest readings ordered by sensor id
    pub fn temps(&self) -> impl Iterator<Item = &TempReading> {
        self.temps.values()
    }

    pub fn doors(&self) -> Vec<DoorView> {
        self.registry
            .doors()
            .map(|record| DoorView {
                record: record.clone(),
                last_report: self.reports.get(&record.id).copied(),
            })
            .collect()
    }

    pub fn door(&self, id: &str) -> Option<DoorRecord> {
        self.registry.door(id).cloned()
    }

    /// Latch the security flag. Returns the fail-secure doors to close.
    pub fn raise_security_alarm(&mut self) -> Vec<DoorRecord> {
        self.security_alarm = true;
        self.registry.doors_with_mode(FailureMode::FailSecure)
    }

    pub fn security_alarm(&self) -> bool {
        self.security_alarm
    }

    pub fn count(&self, kind: DeviceKind) -> usize {
        self.registry.count(kind)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
