// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod door;
pub mod fire;
pub mod hello;
pub mod scan;
pub mod temp;
