// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kw-wire: wire protocols spoken between keyward devices
//!
//! - [`message`]: the ASCII command/response grammar carried over TCP
//! - [`frame`]: `#`-terminated framing over async streams
//! - [`datagram`]: the fixed binary layouts carried over UDP

pub mod datagram;
pub mod frame;
pub mod message;

pub use datagram::{CodecError, Datagram, TempReading, MAX_DATAGRAM_LEN, MAX_TEMP_RELAYS};
pub use frame::{
    read_frame, read_message, write_message, ProtocolError, DEFAULT_TIMEOUT, MAX_MESSAGE_LEN,
    TERMINATOR,
};
pub use message::{MalformedMessage, Message};
