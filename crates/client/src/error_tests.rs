// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    rejected = { ClientError::Rejected("Access denied".into()), "Access denied" },
    timeout = { ClientError::ConnectTimeout(5), "5s" },
    operation = { ClientError::OperationFailed(Operation::ClaimThread), "claim thread failed" },
    not_allowed = { ClientError::NotAllowed("only support agents can claim tickets"), "claim" },
)]
fn error_display_contains(err: ClientError, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn error_from_transport() {
    let err: ClientError = TransportError::ConnectionClosed.into();
    assert!(matches!(err, ClientError::Transport(_)));
}

#[test]
fn error_from_core() {
    let err: ClientError = hl_core::Error::MissingTerminator.into();
    assert!(matches!(err, ClientError::Protocol(_)));
}
