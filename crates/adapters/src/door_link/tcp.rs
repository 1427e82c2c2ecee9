// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TCP door link

use std::net::SocketAddrV4;
use std::time::Duration;

use async_trait::async_trait;
use kw_core::{DoorCommand, DoorReply};
use kw_wire::{read_message, write_message, Message, ProtocolError, DEFAULT_TIMEOUT};
use tokio::io::BufReader;
use tokio::net::TcpStream;

use super::{DoorLink, LinkError};

/// Opens a fresh connection per exchange
#[derive(Debug, Clone)]
pub struct TcpDoorLink {
    timeout: Duration,
}

impl TcpDoorLink {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn connect(&self, peer: SocketAddrV4) -> Result<TcpStream, LinkError> {
        tokio::time::timeout(self.timeout, TcpStream::connect(peer))
            .await
            .map_err(|_| LinkError::ConnectTimeout(peer))?
            .map_err(|source| LinkError::Connect { peer, source })
    }
}

impl Default for TcpDoorLink {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl DoorLink for TcpDoorLink {
    async fn command(
        &self,
        door: SocketAddrV4,
        command: DoorCommand,
    ) -> Result<Vec<DoorReply>, LinkError> {
        let stream = self.connect(door).await?;
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        write_message(&mut writer, &Message::Command(command), self.timeout).await?;

        let mut replies = Vec::new();
        loop {
            match read_message(&mut reader, self.timeout).await {
                Ok(Message::Reply(reply)) => {
                    replies.push(reply);
                    if reply.is_final() {
                        break;
                    }
                }
                Ok(other) => return Err(LinkError::Unexpected(other)),
                Err(ProtocolError::ConnectionClosed) => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(replies)
    }

    async fn notify(&self, peer: SocketAddrV4, message: &Message) -> Result<(), LinkError> {
        let mut stream = self.connect(peer).await?;
        write_message(&mut stream, message, self.timeout).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tcp_tests.rs"]
mod tests;
