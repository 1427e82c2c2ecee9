// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot exchanges with the overseer and doors

use std::net::SocketAddrV4;
use std::time::Duration;

use kw_core::{DoorCommand, DoorReply};
use kw_wire::{read_message, write_message, CodecError, Datagram, Message, ProtocolError};
use thiserror::Error;
use tokio::io::BufReader;
use tokio::net::{TcpStream, UdpSocket};

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Could not connect to {0}")]
    Unreachable(SocketAddrV4, #[source] std::io::Error),

    #[error("Timed out connecting to {0}")]
    ConnectTimeout(SocketAddrV4),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(Message),

    #[error("No response from {0}")]
    NoResponse(SocketAddrV4),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A TCP peer speaking the `#` protocol
pub struct Client {
    peer: SocketAddrV4,
    timeout: Duration,
}

impl Client {
    pub fn new(peer: SocketAddrV4, timeout: Duration) -> Self {
        Self { peer, timeout }
    }

    async fn connect(&self) -> Result<TcpStream, ClientError> {
        match tokio::time::timeout(self.timeout, TcpStream::connect(self.peer)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(ClientError::Unreachable(self.peer, e)),
            Err(_) => Err(ClientError::ConnectTimeout(self.peer)),
        }
    }

    /// Send `message` and collect responses until the peer closes the
    /// connection or `done` says the exchange is over
    async fn exchange(
        &self,
        message: &Message,
        done: impl Fn(&Message) -> bool,
    ) -> Result<Vec<Message>, ClientError> {
        let stream = self.connect().await?;
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        write_message(&mut writer, message, self.timeout).await?;

        let mut responses = Vec::new();
        loop {
            match read_message(&mut reader, self.timeout).await {
                Ok(response) => {
                    let finished = done(&response);
                    responses.push(response);
                    if finished {
                        return Ok(responses);
                    }
                }
                Err(ProtocolError::ConnectionClosed) => return Ok(responses),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// `CARDREADER <id> SCANNED <code>#`, expecting `ALLOWED#` or `DENIED#`
    pub async fn scan(&self, reader: &str, code: &str) -> Result<bool, ClientError> {
        let scan = Message::Scanned {
            reader: reader.to_string(),
            code: code.to_string(),
        };
        let responses = self.exchange(&scan, |_| true).await?;
        match responses.into_iter().next() {
            Some(Message::Allowed) => Ok(true),
            Some(Message::Denied) => Ok(false),
            Some(other) => Err(ClientError::UnexpectedResponse(other)),
            None => Err(ClientError::NoResponse(self.peer)),
        }
    }

    /// Deliver a message that has no response
    pub async fn announce(&self, message: &Message) -> Result<(), ClientError> {
        let stream = self.connect().await?;
        let (_, mut writer) = stream.into_split();
        write_message(&mut writer, message, self.timeout).await?;
        Ok(())
    }

    /// Send a door command and collect replies up to the first final one
    pub async fn door(&self, command: DoorCommand) -> Result<Vec<DoorReply>, ClientError> {
        let responses = self
            .exchange(&Message::Command(command), |m| {
                m.as_reply().is_some_and(|r| r.is_final())
            })
            .await?;
        responses
            .into_iter()
            .map(|m| match m.as_reply() {
                Some(reply) => Ok(reply),
                None => Err(ClientError::UnexpectedResponse(m)),
            })
            .collect()
    }
}

/// Send one datagram from an ephemeral socket
pub async fn send_datagram(to: SocketAddrV4, datagram: &Datagram) -> Result<(), ClientError> {
    let bytes = datagram.encode()?;
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.send_to(&bytes, to).await?;
    Ok(())
}
