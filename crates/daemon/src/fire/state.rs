// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fire unit decision state

use std::net::{SocketAddr, SocketAddrV4};
use std::time::Duration;

use kw_core::DetectionWindow;
use kw_wire::{Datagram, TempReading};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Side effects requested by [`FireState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FireAction {
    /// Answer a `DOOR` datagram with `DREG` for `door`
    Confirm { to: SocketAddr, door: SocketAddrV4 },
    /// Send `OPEN_EMERG#` to each door
    OpenDoors(Vec<SocketAddrV4>),
}

/// Forwarding list, detection window and alarm flag
pub struct FireState {
    threshold: f32,
    window: DetectionWindow,
    doors: Vec<SocketAddrV4>,
    alarm: watch::Sender<bool>,
}

impl FireState {
    pub fn new(threshold: f32, detection_period: Duration, min_detections: usize) -> Self {
        let (alarm, _) = watch::channel(false);
        Self {
            threshold,
            window: DetectionWindow::new(detection_period, min_detections),
            doors: Vec::new(),
            alarm,
        }
    }

    /// Doors that receive `OPEN_EMERG#`, in registration order
    pub fn doors(&self) -> &[SocketAddrV4] {
        &self.doors
    }

    pub fn is_alarmed(&self) -> bool {
        *self.alarm.borrow()
    }

    /// Watch the alarm flag; it only ever goes from `false` to `true`
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.alarm.subscribe()
    }

    /// Add a door to the forwarding list unless already present.
    ///
    /// A door joining while the alarm is raised is opened right away.
    pub fn add_door(&mut self, door: SocketAddrV4) -> Vec<FireAction> {
        if self.doors.contains(&door) {
            return Vec::new();
        }
        self.doors.push(door);
        info!(%door, doors = self.doors.len(), "door added to forwarding list");
        if self.is_alarmed() {
            vec![FireAction::OpenDoors(vec![door])]
        } else {
            Vec::new()
        }
    }

    /// Handle one datagram received at `now` (microseconds)
    pub fn on_datagram(
        &mut self,
        datagram: Datagram,
        from: SocketAddr,
        now: u64,
    ) -> Vec<FireAction> {
        match datagram {
            Datagram::Temp(reading) => self.on_temp(&reading, now),
            Datagram::Fire => {
                info!(%from, "FIRE received");
                vec![self.raise()]
            }
            Datagram::Door(door) => {
                let mut actions = self.add_door(door);
                actions.insert(0, FireAction::Confirm { to: from, door });
                actions
            }
            Datagram::DoorRegistered(door) => {
                debug!(%from, %door, "ignoring stray DREG");
                Vec::new()
            }
        }
    }

    fn on_temp(&mut self, reading: &TempReading, now: u64) -> Vec<FireAction> {
        // NaN and infinities are never detections
        let hot = reading.temperature.is_finite() && reading.temperature >= self.threshold;
        if !hot {
            return Vec::new();
        }
        debug!(
            sensor = reading.sensor_id,
            temperature = reading.temperature,
            "detection"
        );
        if self.window.record(reading.recorded_at, now) {
            warn!(
                detections = self.window.len(),
                min = self.window.min_detections(),
                oldest_us = ?self.window.oldest(),
                "detection threshold reached"
            );
            vec![self.raise()]
        } else {
            Vec::new()
        }
    }

    fn raise(&mut self) -> FireAction {
        if !self.alarm.send_replace(true) {
            warn!("fire alarm raised");
        }
        FireAction::OpenDoors(self.doors.clone())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
