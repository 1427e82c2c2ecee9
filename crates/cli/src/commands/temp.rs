// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kw temp <addr> <temperature>` - Relay one temperature reading

use std::net::SocketAddrV4;

use anyhow::Result;
use clap::Args;
use kw_core::{Clock, SystemClock};
use kw_wire::{Datagram, TempReading};

use crate::client::send_datagram;

#[derive(Args)]
pub struct TempArgs {
    /// Receiver endpoint (fire unit or overseer)
    pub to: SocketAddrV4,

    /// Temperature in degrees
    #[arg(allow_negative_numbers = true)]
    pub temperature: f32,

    /// Sensor id
    #[arg(long, default_value_t = 1)]
    pub sensor: u16,

    /// Reading timestamp in microseconds since the Unix epoch (default: now)
    #[arg(long)]
    pub at: Option<u64>,
}

pub async fn temp(args: TempArgs) -> Result<()> {
    let reading = TempReading {
        recorded_at: args.at.unwrap_or_else(|| SystemClock.now_micros()),
        temperature: args.temperature,
        sensor_id: args.sensor,
        relays: Vec::new(),
    };
    send_datagram(args.to, &Datagram::Temp(reading)).await?;
    println!("TEMP {} sent to {}", args.temperature, args.to);
    Ok(())
}
