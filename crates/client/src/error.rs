// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::api::Operation;
use crate::transport::TransportError;

/// All errors surfaced by the chat client.
///
/// None of these is fatal: the worst outcome is a reset to an empty,
/// reconnectable session.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("protocol error: {0}")]
    Protocol(#[from] hl_core::Error),

    #[error("not connected to the chat broker")]
    NotConnected,

    #[error("no credential: log in first")]
    NoCredential,

    #[error("broker did not acknowledge the connection within {0}s")]
    ConnectTimeout(u64),

    #[error("broker rejected the session: {0}")]
    Rejected(String),

    #[error("{0} failed")]
    OperationFailed(Operation),

    #[error("not allowed: {0}")]
    NotAllowed(&'static str),

    #[error("{0}")]
    InvalidInput(String),

    #[error("chat session has shut down")]
    SessionClosed,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
