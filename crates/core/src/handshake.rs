// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Door registration handshake state machine
//!
//! At-least-once delivery of one door endpoint over UDP: send `DOOR`, wait
//! for a `DREG` carrying the same address and port, resend on timeout, give
//! up after [`MAX_ATTEMPTS`] sends. Confirmation matches on endpoint
//! equality only, so late or duplicated confirmations are harmless.

use std::net::SocketAddrV4;

/// Sends per door before giving up
pub const MAX_ATTEMPTS: u32 = 3;

/// Events that drive a pending registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeInput {
    /// Begin the exchange
    Start,
    /// The resend delay elapsed without a matching confirmation
    Timeout,
    /// A `DREG` datagram arrived carrying this endpoint
    Confirmation(SocketAddrV4),
}

/// Side effects requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeEffect {
    /// Send a `DOOR` datagram for the endpoint (attempt number included)
    Send { door: SocketAddrV4, attempt: u32 },
    /// The peer confirmed the endpoint
    Confirmed { door: SocketAddrV4 },
    /// Every attempt went unconfirmed
    GiveUp { door: SocketAddrV4, attempts: u32 },
}

/// Per-door acknowledgement state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRegistration {
    door: SocketAddrV4,
    attempts: u32,
    max_attempts: u32,
    confirmed: bool,
    exhausted: bool,
}

impl PendingRegistration {
    pub fn new(door: SocketAddrV4) -> Self {
        Self {
            door,
            attempts: 0,
            max_attempts: MAX_ATTEMPTS,
            confirmed: false,
            exhausted: false,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn door(&self) -> SocketAddrV4 {
        self.door
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// Finished one way or the other
    pub fn is_settled(&self) -> bool {
        self.confirmed || self.exhausted
    }

    /// Pure state transition function
    pub fn transition(&self, input: HandshakeInput) -> (PendingRegistration, Vec<HandshakeEffect>) {
        let mut next = self.clone();
        let mut effects = Vec::new();

        if self.is_settled() {
            return (next, effects);
        }

        match input {
            HandshakeInput::Start if self.attempts == 0 => {
                next.attempts = 1;
                effects.push(HandshakeEffect::Send {
                    door: self.door,
                    attempt: 1,
                });
            }
            HandshakeInput::Start => {}
            HandshakeInput::Timeout if self.attempts < self.max_attempts => {
                next.attempts += 1;
                effects.push(HandshakeEffect::Send {
                    door: self.door,
                    attempt: next.attempts,
                });
            }
            HandshakeInput::Timeout => {
                next.exhausted = true;
                effects.push(HandshakeEffect::GiveUp {
                    door: self.door,
                    attempts: self.attempts,
                });
            }
            HandshakeInput::Confirmation(endpoint) if endpoint == self.door => {
                next.confirmed = true;
                effects.push(HandshakeEffect::Confirmed { door: self.door });
            }
            // Confirmation for some other door; keep waiting
            HandshakeInput::Confirmation(_) => {}
        }

        (next, effects)
    }
}

#[cfg(test)]
#[path = "handshake_tests.rs"]
mod tests;
