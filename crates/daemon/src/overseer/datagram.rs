// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Overseer UDP endpoint: door confirmations for fire units and
//! temperature readings.

use std::net::SocketAddr;

use kw_wire::Datagram;
use tokio::net::UdpSocket;
use tracing::{debug, trace, warn};

use super::OverseerContext;

pub(crate) async fn handle_datagram<L, R>(
    ctx: &OverseerContext<L, R>,
    socket: &UdpSocket,
    bytes: &[u8],
    from: SocketAddr,
) {
    let datagram = match Datagram::decode(bytes) {
        Ok(datagram) => datagram,
        Err(e) => {
            debug!(%from, error = %e, "dropping malformed datagram");
            return;
        }
    };

    match datagram {
        Datagram::Door(door) => {
            let vouched = ctx.lock().vouches_for(door);
            if !vouched {
                debug!(%from, %door, "no fail-safe door at endpoint, not confirming");
                return;
            }
            let reply = match Datagram::DoorRegistered(door).encode() {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(error = %e, "failed to encode DREG");
                    return;
                }
            };
            match socket.send_to(&reply, from).await {
                Ok(_) => debug!(%from, %door, "confirmed door"),
                Err(e) => warn!(%from, %door, error = %e, "failed to send DREG"),
            }
        }
        Datagram::Temp(reading) => {
            trace!(
                sensor = reading.sensor_id,
                temperature = reading.temperature,
                "temperature reading"
            );
            ctx.lock().record_temp(reading);
        }
        Datagram::Fire | Datagram::DoorRegistered(_) => {
            debug!(%from, "ignoring datagram");
        }
    }
}
