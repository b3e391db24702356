// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! hl-client: real-time sync core of the helpline support chat.
//!
//! Keeps a local view of tickets, messages and typing state consistent with
//! a STOMP broker that pushes updates over a WebSocket.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐ commands ┌───────────────┐     ┌─────────────┐
//! │ SessionHandle │─────────►│  ChatSession  │────►│ Connection  │──► broker
//! │  (REST calls) │◄─────────│  (run loop)   │◄────│ (Transport) │◄──
//! └───────────────┘  watch   └───────────────┘     └─────────────┘
//!         │                     │    │    │
//!         ▼                     ▼    ▼    ▼
//!   ┌────────────┐   Subscriptions Reconciler Typing
//!   │ SupportApi │
//!   │  (trait)   │
//!   └────────────┘
//! ```
//!
//! # Features
//!
//! - Subscriptions re-issued transparently after a reconnect
//! - Role-scoped thread feed with visibility filtering
//! - Stale deliveries from superseded subscriptions are dropped
//! - Debounced local typing signal, aggregated remote typing label
//! - Injectable transport and REST traits for testing

pub mod api;
pub mod config;
pub mod connection;
pub mod error;
pub mod handle;
pub mod reconciler;
pub mod session;
pub mod state;
pub mod subscriptions;
pub mod transport;
pub mod typing;
pub mod view;

pub use api::{ApiError, ApiFuture, Operation, SupportApi};
pub use config::ClientConfig;
pub use connection::{Connection, ConnectionState, Received, SubscriptionId};
pub use error::{ClientError, ClientResult};
pub use handle::SessionHandle;
pub use reconciler::Reconciled;
pub use session::{ChatSession, SessionCommand};
pub use state::{ChatState, Notice};
pub use subscriptions::{SubscriptionKind, SubscriptionManager};
pub use transport::{Transport, TransportError, WebSocketTransport};
pub use typing::{RemoteTypers, TypingDebounce};
pub use view::{FilterCounts, ThreadFilter};

#[cfg(test)]
mod test_helpers;
