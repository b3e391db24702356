// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Contract of the REST collaborator.
//!
//! Thread records, reservations, agents and message history are fetched and
//! mutated over HTTP by an external client. The chat core only consumes
//! the results: success values seed or refresh local state, failures become
//! an opaque [`Operation`] failure notice. Nothing here retries.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use hl_core::{ChatMessage, ReservationItem, SupportAgent, ThreadItem};

/// Error returned by a [`SupportApi`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("server returned status {0}")]
    Status(u16),

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Boxed future returned by [`SupportApi`] methods.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// REST calls the chat core depends on.
pub trait SupportApi: Send + Sync {
    /// Threads visible to the signed-in user.
    fn list_threads(&self) -> ApiFuture<'_, Vec<ThreadItem>>;

    /// Reservations of the signed-in customer.
    fn list_reservations(&self) -> ApiFuture<'_, Vec<ReservationItem>>;

    /// Every support agent, including the caller.
    fn list_support_agents(&self) -> ApiFuture<'_, Vec<SupportAgent>>;

    /// Opens a ticket, optionally linked to a reservation.
    fn create_thread(
        &self,
        subject: String,
        reservation_id: Option<String>,
    ) -> ApiFuture<'_, ThreadItem>;

    fn close_thread(&self, thread_id: String) -> ApiFuture<'_, ThreadItem>;

    fn claim_thread(&self, thread_id: String) -> ApiFuture<'_, ThreadItem>;

    fn transfer_thread(
        &self,
        thread_id: String,
        target_user_id: String,
    ) -> ApiFuture<'_, ThreadItem>;

    /// Message history of a thread, oldest first.
    fn load_messages(&self, thread_id: String) -> ApiFuture<'_, Vec<ChatMessage>>;
}

/// Names a collaborator call in failure notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListThreads,
    ListReservations,
    ListSupportAgents,
    CreateThread,
    CloseThread,
    ClaimThread,
    TransferThread,
    LoadMessages,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ListThreads => "list threads",
            Operation::ListReservations => "list reservations",
            Operation::ListSupportAgents => "list support agents",
            Operation::CreateThread => "create thread",
            Operation::CloseThread => "close thread",
            Operation::ClaimThread => "claim thread",
            Operation::TransferThread => "transfer thread",
            Operation::LoadMessages => "load messages",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
