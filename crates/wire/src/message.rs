// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TCP message grammar
//!
//! Messages are whitespace-separated ASCII tokens. The `#` terminator is
//! handled by [`crate::frame`]; `Display` renders the message body only.

use std::fmt;
use std::net::SocketAddrV4;
use std::str::FromStr;

use kw_core::{DoorCommand, DoorReply, FailureMode};
use thiserror::Error;

/// A message body that matches no known form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed message: {0:?}")]
pub struct MalformedMessage(pub String);

/// Every message exchanged over a keyward TCP connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// `DOOR <id> <addr>:<port> <mode>`
    DoorHello {
        id: String,
        endpoint: SocketAddrV4,
        mode: FailureMode,
    },
    /// `DOOR <id> <reply>`, sent by a door after a terminal transition
    DoorReport { id: String, reply: DoorReply },
    /// `CARDREADER <id> HELLO`
    CardReaderHello { id: String },
    /// `CARDREADER <id> SCANNED <code>`
    Scanned { reader: String, code: String },
    /// `FIREALARM <addr>:<port> HELLO`
    FireAlarmHello { endpoint: SocketAddrV4 },
    Command(DoorCommand),
    Reply(DoorReply),
    Allowed,
    Denied,
}

impl Message {
    /// Door command carried by this message, if any
    pub fn as_command(&self) -> Option<DoorCommand> {
        match self {
            Message::Command(command) => Some(*command),
            _ => None,
        }
    }

    /// Door reply carried by this message, if any
    pub fn as_reply(&self) -> Option<DoorReply> {
        match self {
            Message::Reply(reply) => Some(*reply),
            _ => None,
        }
    }
}

impl From<DoorCommand> for Message {
    fn from(command: DoorCommand) -> Self {
        Message::Command(command)
    }
}

impl From<DoorReply> for Message {
    fn from(reply: DoorReply) -> Self {
        Message::Reply(reply)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::DoorHello { id, endpoint, mode } => {
                write!(f, "DOOR {} {} {}", id, endpoint, mode)
            }
            Message::DoorReport { id, reply } => write!(f, "DOOR {} {}", id, reply),
            Message::CardReaderHello { id } => write!(f, "CARDREADER {} HELLO", id),
            Message::Scanned { reader, code } => {
                write!(f, "CARDREADER {} SCANNED {}", reader, code)
            }
            Message::FireAlarmHello { endpoint } => write!(f, "FIREALARM {} HELLO", endpoint),
            Message::Command(command) => write!(f, "{}", command),
            Message::Reply(reply) => write!(f, "{}", reply),
            Message::Allowed => f.write_str("ALLOWED"),
            Message::Denied => f.write_str("DENIED"),
        }
    }
}

impl FromStr for Message {
    type Err = MalformedMessage;

    fn from_str(body: &str) -> Result<Self, Self::Err> {
        let malformed = || MalformedMessage(body.to_string());
        let tokens: Vec<&str> = body.split_whitespace().collect();

        let message = match tokens.as_slice() {
            ["DOOR", id, endpoint, mode] => Message::DoorHello {
                id: id.to_string(),
                endpoint: endpoint.parse().map_err(|_| malformed())?,
                mode: mode.parse().map_err(|_| malformed())?,
            },
            ["DOOR", id, reply] => Message::DoorReport {
                id: id.to_string(),
                reply: reply.parse().map_err(|_| malformed())?,
            },
            ["CARDREADER", id, "HELLO"] => Message::CardReaderHello { id: id.to_string() },
            ["CARDREADER", reader, "SCANNED", code] => Message::Scanned {
                reader: reader.to_string(),
                code: code.to_string(),
            },
            ["FIREALARM", endpoint, "HELLO"] => Message::FireAlarmHello {
                endpoint: endpoint.parse().map_err(|_| malformed())?,
            },
            ["ALLOWED"] => Message::Allowed,
            ["DENIED"] => Message::Denied,
            [word] => {
                if let Ok(command) = word.parse::<DoorCommand>() {
                    Message::Command(command)
                } else if let Ok(reply) = word.parse::<DoorReply>() {
                    Message::Reply(reply)
                } else {
                    return Err(malformed());
                }
            }
            _ => return Err(malformed()),
        };
        Ok(message)
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
