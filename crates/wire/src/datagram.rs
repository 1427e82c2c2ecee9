// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! UDP datagram codec
//!
//! Every datagram starts with a 4-byte ASCII header. Multi-byte fields are
//! big-endian.
//!
//! ```text
//! DOOR / DREG  header(4) ipv4(4) port(2)
//! FIRE         header(4)
//! TEMP         header(4) recorded_at_us(8) temperature_f32(4) sensor(2)
//!              count(1) count x [ipv4(4) port(2)]
//! ```

use std::net::{Ipv4Addr, SocketAddrV4};

use bytes::{Buf, BufMut, Bytes, BytesMut};

const DOOR_HEADER: &[u8; 4] = b"DOOR";
const DREG_HEADER: &[u8; 4] = b"DREG";
const FIRE_HEADER: &[u8; 4] = b"FIRE";
const TEMP_HEADER: &[u8; 4] = b"TEMP";

const HEADER_LEN: usize = 4;
const ENDPOINT_LEN: usize = 6;
const TEMP_FIXED_LEN: usize = 8 + 4 + 2 + 1;

/// Maximum relay endpoints carried by a `TEMP` datagram
pub const MAX_TEMP_RELAYS: usize = 50;

/// Largest datagram this codec produces
pub const MAX_DATAGRAM_LEN: usize =
    HEADER_LEN + TEMP_FIXED_LEN + MAX_TEMP_RELAYS * ENDPOINT_LEN;

/// Error type for codec operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("insufficient data")]
    InsufficientData,

    #[error("unknown header: {0:?}")]
    UnknownHeader([u8; 4]),

    #[error("too many relay endpoints: {0} (max {MAX_TEMP_RELAYS})")]
    TooManyRelays(usize),

    #[error("{0} trailing bytes")]
    TrailingBytes(usize),
}

/// A temperature reading as relayed to a fire unit or the overseer
#[derive(Debug, Clone, PartialEq)]
pub struct TempReading {
    /// Sensor-side timestamp in microseconds since the Unix epoch
    pub recorded_at: u64,
    pub temperature: f32,
    pub sensor_id: u16,
    /// Endpoints that already relayed this reading
    pub relays: Vec<SocketAddrV4>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Datagram {
    /// Register a door endpoint
    Door(SocketAddrV4),
    /// Confirm a `Door` registration, echoing its endpoint
    DoorRegistered(SocketAddrV4),
    /// Raise the fire alarm unconditionally
    Fire,
    Temp(TempReading),
}

fn put_endpoint(buf: &mut BytesMut, endpoint: &SocketAddrV4) {
    buf.put_slice(&endpoint.ip().octets());
    buf.put_u16(endpoint.port());
}

fn get_endpoint(data: &mut impl Buf) -> Result<SocketAddrV4, CodecError> {
    if data.remaining() < ENDPOINT_LEN {
        return Err(CodecError::InsufficientData);
    }
    let ip = Ipv4Addr::from(data.get_u32());
    let port = data.get_u16();
    Ok(SocketAddrV4::new(ip, port))
}

/// Encode a datagram to bytes
pub fn encode(datagram: &Datagram) -> Result<Bytes, CodecError> {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + ENDPOINT_LEN);

    match datagram {
        Datagram::Door(endpoint) => {
            buf.put_slice(DOOR_HEADER);
            put_endpoint(&mut buf, endpoint);
        }
        Datagram::DoorRegistered(endpoint) => {
            buf.put_slice(DREG_HEADER);
            put_endpoint(&mut buf, endpoint);
        }
        Datagram::Fire => buf.put_slice(FIRE_HEADER),
        Datagram::Temp(reading) => {
            if reading.relays.len() > MAX_TEMP_RELAYS {
                return Err(CodecError::TooManyRelays(reading.relays.len()));
            }
            buf.reserve(TEMP_FIXED_LEN + reading.relays.len() * ENDPOINT_LEN);
            buf.put_slice(TEMP_HEADER);
            buf.put_u64(reading.recorded_at);
            buf.put_f32(reading.temperature);
            buf.put_u16(reading.sensor_id);
            buf.put_u8(reading.relays.len() as u8);
            for relay in &reading.relays {
                put_endpoint(&mut buf, relay);
            }
        }
    }

    Ok(buf.freeze())
}

/// Decode a datagram, rejecting trailing bytes
pub fn decode(data: &mut impl Buf) -> Result<Datagram, CodecError> {
    if data.remaining() < HEADER_LEN {
        return Err(CodecError::InsufficientData);
    }
    let mut header = [0u8; HEADER_LEN];
    data.copy_to_slice(&mut header);

    let datagram = match &header {
        DOOR_HEADER => Datagram::Door(get_endpoint(data)?),
        DREG_HEADER => Datagram::DoorRegistered(get_endpoint(data)?),
        FIRE_HEADER => Datagram::Fire,
        TEMP_HEADER => Datagram::Temp(decode_temp(data)?),
        _ => return Err(CodecError::UnknownHeader(header)),
    };

    if data.has_remaining() {
        return Err(CodecError::TrailingBytes(data.remaining()));
    }
    Ok(datagram)
}

fn decode_temp(data: &mut impl Buf) -> Result<TempReading, CodecError> {
    if data.remaining() < TEMP_FIXED_LEN {
        return Err(CodecError::InsufficientData);
    }
    let recorded_at = data.get_u64();
    let temperature = data.get_f32();
    let sensor_id = data.get_u16();
    let count = data.get_u8() as usize;
    if count > MAX_TEMP_RELAYS {
        return Err(CodecError::TooManyRelays(count));
    }

    let relays = (0..count)
        .map(|_| get_endpoint(data))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TempReading {
        recorded_at,
        temperature,
        sensor_id,
        relays,
    })
}

impl Datagram {
    pub fn encode(&self) -> Result<Bytes, CodecError> {
        encode(self)
    }

    pub fn decode(mut bytes: &[u8]) -> Result<Self, CodecError> {
        decode(&mut bytes)
    }
}

#[cfg(test)]
#[path = "datagram_tests.rs"]
mod tests;
