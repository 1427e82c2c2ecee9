// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kw fire <addr>` - Send a FIRE datagram to a fire unit

use std::net::SocketAddrV4;

use anyhow::Result;
use clap::Args;
use kw_wire::Datagram;

use crate::client::send_datagram;

#[derive(Args)]
pub struct FireArgs {
    /// Fire unit endpoint (addr:port)
    pub unit: SocketAddrV4,
}

pub async fn fire(args: FireArgs) -> Result<()> {
    send_datagram(args.unit, &Datagram::Fire).await?;
    println!("FIRE sent to {}", args.unit);
    Ok(())
}
