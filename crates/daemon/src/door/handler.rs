// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Door connection handling.

use std::sync::Arc;
use std::time::Duration;

use kw_adapters::DoorLink;
use kw_core::DoorReply;
use kw_wire::{read_message, write_message, Message, ProtocolError};
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::DoorContext;

/// Handle one inbound connection.
///
/// A plain command is answered and the connection closed. Once an
/// override reply has been sent, the connection stays open and every
/// further command on it is served the same way.
pub(crate) async fn handle_connection<L: DoorLink>(
    ctx: Arc<DoorContext<L>>,
    stream: TcpStream,
) -> Result<(), ProtocolError> {
    let timeout = ctx.config.io_timeout;
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut latched = false;

    loop {
        // Override connections are held open by the peer; no read timeout
        let wait = if latched { Duration::MAX } else { timeout };
        let message = match read_message(&mut reader, wait).await {
            Ok(message) => message,
            Err(ProtocolError::ConnectionClosed) => {
                debug!(latched, "peer closed the connection");
                return Ok(());
            }
            Err(ProtocolError::Malformed(e)) => {
                debug!(error = %e, "dropping connection");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let Some(command) = message.as_command() else {
            debug!(%message, "not a door command, closing");
            return Ok(());
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        let execution = {
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move { ctx.controller.execute(command, tx).await })
        };

        let mut last = None;
        while let Some(reply) = rx.recv().await {
            last = Some(reply);
            if let Err(e) = write_message(&mut writer, &Message::Reply(reply), timeout).await {
                // The spawned execution still completes any issued actuation
                warn!(%command, error = %e, "failed to send reply");
                return Err(e);
            }
            if ctx.config.report_to_overseer && reply.is_reportable() {
                report(&ctx, reply).await;
            }
        }

        match execution.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(%command, error = %e, "actuation failed"),
            Err(e) => warn!(%command, error = %e, "command task failed"),
        }

        latched |= matches!(
            last,
            Some(DoorReply::EmergencyMode | DoorReply::SecureMode)
        );
        if !latched {
            return Ok(());
        }
    }
}

/// Tell the overseer about a terminal reply; failures are logged only
async fn report<L: DoorLink>(ctx: &DoorContext<L>, reply: DoorReply) {
    let message = Message::DoorReport {
        id: ctx.config.id.clone(),
        reply,
    };
    if let Err(e) = ctx.link.notify(ctx.config.overseer, &message).await {
        debug!(error = %e, "report not delivered");
    }
}
