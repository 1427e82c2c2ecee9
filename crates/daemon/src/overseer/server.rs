// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Overseer TCP connection handling.

use std::net::SocketAddrV4;
use std::sync::Arc;

use kw_adapters::{DoorLink, Registrar};
use kw_core::{DoorCommand, DoorRecord, DoorReply};
use kw_wire::{read_message, write_message, Message, ProtocolError};
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

use super::decision::{decide, AccessDecision};
use super::OverseerContext;

/// Handle a single device connection: one message, at most one response
pub(crate) async fn handle_connection<L: DoorLink, R: Registrar>(
    ctx: Arc<OverseerContext<L, R>>,
    stream: TcpStream,
) -> Result<(), ProtocolError> {
    let timeout = ctx.config.io_timeout;
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let message = match read_message(&mut reader, timeout).await {
        Ok(message) => message,
        Err(ProtocolError::ConnectionClosed) => {
            debug!("peer disconnected before sending a message");
            return Ok(());
        }
        Err(ProtocolError::Malformed(e)) => {
            debug!(error = %e, "dropping malformed message");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    debug!(%message, "received");

    match message {
        Message::DoorHello { id, endpoint, mode } => {
            register_door(&ctx, DoorRecord::new(id, endpoint, mode));
        }

        Message::CardReaderHello { id } => {
            let registered = ctx.lock().register_card_reader(&id);
            match registered {
                Ok(upsert) => info!(reader_id = %id, ?upsert, "card reader registered"),
                Err(e) => error!(reader_id = %id, error = %e, "card reader rejected"),
            }
        }

        Message::FireAlarmHello { endpoint } => register_fire_unit(&ctx, endpoint),

        Message::Scanned { reader, code } => {
            let decision = {
                let state = ctx.lock();
                decide(
                    state.registry(),
                    &ctx.authorizations,
                    &ctx.connections,
                    &reader,
                    &code,
                )
            };
            let response = match decision {
                AccessDecision::Allow { .. } => Message::Allowed,
                AccessDecision::Deny { .. } => Message::Denied,
            };
            info!(reader_id = %reader, %response, "scan decided");

            // The reader's round trip ends before any door interaction
            write_message(&mut writer, &response, timeout).await?;
            drop(writer);

            follow_up(&ctx, decision).await;
        }

        Message::DoorReport { id, reply } => {
            info!(door_id = %id, %reply, "door report");
            ctx.lock().record_report(&id, reply);
        }

        other => debug!(message = %other, "ignoring message"),
    }

    Ok(())
}

fn register_door<L: DoorLink, R: Registrar>(ctx: &OverseerContext<L, R>, door: DoorRecord) {
    let registered = ctx.lock().register_door(door.clone());
    match registered {
        Ok((upsert, units)) => {
            info!(
                door_id = %door.id,
                endpoint = %door.endpoint,
                mode = %door.mode,
                ?upsert,
                "door registered"
            );
            for unit in units {
                ctx.push_door(unit, door.endpoint);
            }
        }
        Err(e) => error!(door_id = %door.id, error = %e, "door rejected"),
    }
}

fn register_fire_unit<L: DoorLink, R: Registrar>(
    ctx: &OverseerContext<L, R>,
    endpoint: SocketAddrV4,
) {
    let registered = ctx.lock().register_fire_unit(endpoint);
    match registered {
        Ok((upsert, doors)) => {
            info!(%endpoint, ?upsert, doors = doors.len(), "fire unit registered");
            for door in doors {
                ctx.push_door(endpoint, door);
            }
        }
        Err(e) => error!(%endpoint, error = %e, "fire unit rejected"),
    }
}

/// Door interaction after a scan was answered
async fn follow_up<L: DoorLink, R: Registrar>(
    ctx: &OverseerContext<L, R>,
    decision: AccessDecision,
) {
    match decision {
        AccessDecision::Allow { door } => cycle_door(ctx, &door).await,
        AccessDecision::Deny {
            reason,
            notify: Some(door),
        } => {
            debug!(door_id = %door.id, reason = reason.as_str(), "notifying door of denial");
            if let Err(e) = ctx.link.notify(door.endpoint, &Message::Denied).await {
                warn!(door_id = %door.id, error = %e, "denial not delivered");
            }
        }
        AccessDecision::Deny { reason, notify: None } => {
            debug!(reason = reason.as_str(), "denied");
        }
    }
}

/// Open the door, hold it for the configured duration, then close it
async fn cycle_door<L: DoorLink, R: Registrar>(ctx: &OverseerContext<L, R>, door: &DoorRecord) {
    let replies = match ctx.link.command(door.endpoint, DoorCommand::Open).await {
        Ok(replies) => replies,
        Err(e) => {
            error!(door_id = %door.id, error = %e, "failed to open door");
            return;
        }
    };

    match replies.last() {
        Some(DoorReply::Opened) => {}
        Some(DoorReply::Already) => {
            // Someone else holds the door open; leave closing to them
            info!(door_id = %door.id, "door already open, not scheduling close");
            return;
        }
        last => {
            warn!(door_id = %door.id, ?last, "door did not open, not scheduling close");
            return;
        }
    }

    tokio::time::sleep(ctx.config.door_open_duration).await;

    match ctx.link.command(door.endpoint, DoorCommand::Close).await {
        Ok(replies) => debug!(door_id = %door.id, ?replies, "door closed after dwell"),
        Err(e) => error!(door_id = %door.id, error = %e, "failed to close door"),
    }
}
