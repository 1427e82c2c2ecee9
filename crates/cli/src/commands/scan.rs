// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kw scan <reader> <code>` - Present a credential at a card reader

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::fmt;

use crate::client::Client;
use crate::output::{print, OutputFormat};

#[derive(Args)]
pub struct ScanArgs {
    /// Card reader id
    pub reader: String,

    /// Scanned credential code
    pub code: String,
}

#[derive(Serialize)]
struct ScanOutcome {
    reader: String,
    allowed: bool,
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.allowed { "ALLOWED" } else { "DENIED" })
    }
}

pub async fn scan(args: ScanArgs, client: &Client, format: OutputFormat) -> Result<()> {
    let allowed = client.scan(&args.reader, &args.code).await?;
    print(
        &ScanOutcome {
            reader: args.reader,
            allowed,
        },
        format,
    );
    Ok(())
}
