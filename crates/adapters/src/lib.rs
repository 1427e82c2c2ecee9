// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for network I/O between devices

pub mod door_link;
pub mod registrar;
pub mod traced;

pub use door_link::{DoorLink, LinkError, TcpDoorLink};
pub use registrar::{Registrar, RegistrarError, UdpRegistrar};
pub use traced::{TracedDoorLink, TracedRegistrar};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use door_link::{FakeDoorLink, LinkCall};
#[cfg(any(test, feature = "test-support"))]
pub use registrar::{FakeRegistrar, RegistrarCall};
