// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `#`-terminated framing over async streams
//!
//! There is no length prefix: a reader consumes bytes up to and including
//! the terminator. Readers must be buffered (`BufReader` around a socket
//! half) so consecutive messages on one connection are not lost.

use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::message::{MalformedMessage, Message};

/// Message terminator
pub const TERMINATOR: u8 = b'#';

/// Maximum message size in bytes, terminator included
pub const MAX_MESSAGE_LEN: usize = 1024;

/// Default timeout for a single read or write
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from framing and parsing
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("timed out")]
    Timeout,

    #[error("connection closed")]
    ConnectionClosed,

    #[error("message exceeds {MAX_MESSAGE_LEN} bytes")]
    TooLong,

    #[error("message is not valid UTF-8")]
    InvalidUtf8,

    #[error(transparent)]
    Malformed(#[from] MalformedMessage),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read one message body (terminator stripped, surrounding whitespace trimmed)
pub async fn read_frame<R>(reader: &mut R, timeout: Duration) -> Result<String, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::with_capacity(64);
    let mut limited = (&mut *reader).take(MAX_MESSAGE_LEN as u64);

    let read = tokio::time::timeout(timeout, limited.read_until(TERMINATOR, &mut buf))
        .await
        .map_err(|_| ProtocolError::Timeout)??;

    if read == 0 {
        return Err(ProtocolError::ConnectionClosed);
    }
    if buf.last() != Some(&TERMINATOR) {
        if buf.len() >= MAX_MESSAGE_LEN {
            return Err(ProtocolError::TooLong);
        }
        // Peer closed mid-message
        return Err(ProtocolError::ConnectionClosed);
    }
    buf.pop();

    let body = String::from_utf8(buf).map_err(|_| ProtocolError::InvalidUtf8)?;
    Ok(body.trim().to_string())
}

/// Read and parse one message
pub async fn read_message<R>(reader: &mut R, timeout: Duration) -> Result<Message, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let body = read_frame(reader, timeout).await?;
    let message = body.parse::<Message>()?;
    tracing::trace!(%message, "read message");
    Ok(message)
}

/// Write one message followed by the terminator
pub async fn write_message<W>(
    writer: &mut W,
    message: &Message,
    timeout: Duration,
) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let mut data = message.to_string().into_bytes();
    data.push(TERMINATOR);
    if data.len() > MAX_MESSAGE_LEN {
        return Err(ProtocolError::TooLong);
    }

    tokio::time::timeout(timeout, async {
        writer.write_all(&data).await?;
        writer.flush().await
    })
    .await
    .map_err(|_| ProtocolError::Timeout)??;

    tracing::trace!(%message, "wrote message");
    Ok(())
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
