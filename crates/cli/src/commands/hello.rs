// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kw hello <reader>` - Register a card reader with the overseer

use anyhow::Result;
use clap::Args;
use kw_wire::Message;

use crate::client::Client;

#[derive(Args)]
pub struct HelloArgs {
    /// Card reader id
    pub reader: String,
}

pub async fn hello(args: HelloArgs, client: &Client) -> Result<()> {
    client
        .announce(&Message::CardReaderHello {
            id: args.reader.clone(),
        })
        .await?;
    println!("Registered card reader {}", args.reader);
    Ok(())
}
