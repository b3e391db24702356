// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for hl-core operations.

use thiserror::Error;

/// All possible errors that can occur while decoding wire data.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown frame command: '{0}'")]
    UnknownCommand(String),

    #[error("malformed frame header: '{0}'")]
    MalformedHeader(String),

    #[error("invalid header escape sequence: '\\{0}'")]
    InvalidEscape(char),

    #[error("frame is missing its NUL terminator")]
    MissingTerminator,

    #[error("invalid content-length: '{0}'")]
    InvalidContentLength(String),

    #[error("unknown topic: '{0}'")]
    UnknownTopic(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for hl-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
