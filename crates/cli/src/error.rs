// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.

use std::fmt;
use std::net::SocketAddrV4;

use crate::client::ClientError;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct KwError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
}

impl KwError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Nothing is listening at `peer`
    pub fn unreachable(peer: SocketAddrV4, cause: &std::io::Error) -> Self {
        KwError::new(format!("Could not connect to {}", peer))
            .with_context(cause.to_string())
            .with_suggestion("Check that the daemon is running: kwd <overseer|door|firealarm> <config.toml>")
            .with_suggestion("Pass the overseer endpoint with --overseer or KW_OVERSEER")
    }

    /// The peer closed the connection without answering
    pub fn no_response(peer: SocketAddrV4) -> Self {
        KwError::new(format!("No response from {}", peer))
            .with_context("Requests that are not understood are dropped without a reply")
            .with_suggestion("Check the peer's log for the rejected message")
    }

    /// Rewrite known client failures into a friendlier form
    pub fn explain(error: &anyhow::Error) -> Option<Self> {
        match error.downcast_ref::<ClientError>()? {
            ClientError::Unreachable(peer, cause) => Some(Self::unreachable(*peer, cause)),
            ClientError::NoResponse(peer) => Some(Self::no_response(*peer)),
            _ => None,
        }
    }
}

impl fmt::Display for KwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for KwError {}
