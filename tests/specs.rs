//! Behavioral specifications for a keyward installation.
//!
//! These tests run real daemons on loopback with the production adapter
//! stack and observe them from the outside: wire messages, datagrams, door
//! state and the overseer console.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// access/
#[path = "specs/access/scan.rs"]
mod access_scan;

// fire/
#[path = "specs/fire/alarm.rs"]
mod fire_alarm;
#[path = "specs/fire/registration.rs"]
mod fire_registration;

// site/
#[path = "specs/site/supervisor.rs"]
mod site_supervisor;
