// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Broker connection: STOMP session lifecycle over a [`Transport`].
//!
//! The connection owns the live subscription table and an outbox of frames.
//! `subscribe`, `unsubscribe` and `publish` are synchronous so state
//! handlers can call them without awaiting; the owner drains the outbox with
//! [`Connection::flush`] once the handler has finished.
//!
//! No subscription survives a disconnect: ids issued before it are never
//! live again, so late deliveries under them surface as
//! [`Received::Stale`].

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use hl_core::{Command, Destination, Frame, Topic};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};
use crate::transport::{Transport, TransportError, WebSocketTransport};

/// State of the broker connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        };
        write!(f, "{}", s)
    }
}

/// Handle of one broker subscription, rendered as `sub-N` on the wire.
///
/// Ids are never reused within a connection's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

impl FromStr for SubscriptionId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("sub-")
            .and_then(|n| n.parse().ok())
            .map(SubscriptionId)
            .ok_or(())
    }
}

/// Outcome of reading one frame from the broker.
#[derive(Debug)]
pub enum Received {
    /// A MESSAGE for a live subscription.
    Delivery {
        subscription: SubscriptionId,
        topic: Topic,
        body: String,
    },
    /// A MESSAGE for a subscription that is no longer live.
    Stale { subscription: String },
    /// The broker sent ERROR; the connection has disconnected itself.
    Rejected(String),
    /// The socket closed or failed; the connection is down.
    Lost(Option<TransportError>),
    /// Receipts and other frames with no effect on state.
    Ignored,
}

/// A STOMP session with the chat broker.
pub struct Connection<T: Transport = WebSocketTransport> {
    url: String,
    host: String,
    connect_timeout: Duration,
    transport: T,
    state: ConnectionState,
    next_subscription: u64,
    live: HashMap<SubscriptionId, Topic>,
    outbox: VecDeque<Frame>,
}

impl<T: Transport> Connection<T> {
    pub fn new(url: impl Into<String>, connect_timeout: Duration, transport: T) -> Self {
        let url = url.into();
        let host = host_of(&url).to_string();
        Connection {
            url,
            host,
            connect_timeout,
            transport,
            state: ConnectionState::Disconnected,
            next_subscription: 0,
            live: HashMap::new(),
            outbox: VecDeque::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether `id` is a live subscription.
    pub fn is_live(&self, id: SubscriptionId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Topics with a live subscription, in no particular order.
    pub fn live_topics(&self) -> impl Iterator<Item = &Topic> {
        self.live.values()
    }

    /// Opens a STOMP session authenticated with `token`.
    ///
    /// Returns `Ok(true)` when a new session became ready, `Ok(false)` when
    /// one was already connecting or connected.
    pub async fn connect(&mut self, token: &str) -> ClientResult<bool> {
        if self.state != ConnectionState::Disconnected {
            return Ok(false);
        }
        self.state = ConnectionState::Connecting;
        info!(url = %self.url, "connecting to chat broker");

        let outcome = tokio::time::timeout(self.connect_timeout, self.handshake(token)).await;
        match outcome {
            Ok(Ok(())) => {
                self.state = ConnectionState::Connected;
                info!(url = %self.url, "connected to chat broker");
                Ok(true)
            }
            Ok(Err(e)) => {
                self.teardown().await;
                Err(e)
            }
            Err(_) => {
                self.teardown().await;
                Err(ClientError::ConnectTimeout(self.connect_timeout.as_secs()))
            }
        }
    }

    async fn handshake(&mut self, token: &str) -> ClientResult<()> {
        self.transport.connect(&self.url).await?;
        self.transport
            .send(Frame::connect(&self.host, token))
            .await?;

        loop {
            match self.transport.recv().await? {
                Some(frame) if frame.command == Command::Connected => return Ok(()),
                Some(frame) if frame.command == Command::Error => {
                    return Err(ClientError::Rejected(error_message(&frame)));
                }
                Some(frame) => debug!(command = %frame.command, "frame before CONNECTED"),
                None => return Err(TransportError::ConnectionClosed.into()),
            }
        }
    }

    /// Tears the session down. Safe to call in any state.
    pub async fn disconnect(&mut self) {
        if self.state == ConnectionState::Connected {
            self.outbox.push_back(Frame::disconnect());
            if let Err(e) = self.flush().await {
                debug!(error = %e, "DISCONNECT not delivered");
            }
            info!(url = %self.url, "disconnected from chat broker");
        }
        self.teardown().await;
    }

    async fn teardown(&mut self) {
        // Voided before the close is awaited; `recv` may be dropped mid-close.
        self.state = ConnectionState::Disconnected;
        self.live.clear();
        self.outbox.clear();
        if let Err(e) = self.transport.disconnect().await {
            debug!(error = %e, "transport close failed");
        }
    }

    /// Subscribes to `topic`. Returns `None` when not connected.
    pub fn subscribe(&mut self, topic: Topic) -> Option<SubscriptionId> {
        if !self.is_connected() {
            return None;
        }
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        debug!(subscription = %id, topic = %topic, "subscribe");
        self.outbox
            .push_back(Frame::subscribe(&id.to_string(), &topic));
        self.live.insert(id, topic);
        Some(id)
    }

    /// Cancels a subscription. Unknown or already-voided ids are a no-op.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        if let Some(topic) = self.live.remove(&id) {
            debug!(subscription = %id, topic = %topic, "unsubscribe");
            self.outbox.push_back(Frame::unsubscribe(&id.to_string()));
        }
    }

    /// Queues a SEND frame. Returns `false` when not connected.
    pub fn publish(&mut self, destination: Destination, body: String) -> bool {
        if !self.is_connected() {
            return false;
        }
        self.outbox.push_back(Frame::send(destination, body));
        true
    }

    /// Writes every queued frame to the transport.
    ///
    /// A write failure drops the connection and is returned to the caller.
    pub async fn flush(&mut self) -> ClientResult<()> {
        while let Some(frame) = self.outbox.pop_front() {
            if let Err(e) = self.transport.send(frame).await {
                warn!(error = %e, "broker write failed");
                self.teardown().await;
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Reads the next frame and classifies it.
    pub async fn recv(&mut self) -> Received {
        if !self.is_connected() {
            return Received::Lost(None);
        }
        match self.transport.recv().await {
            Ok(Some(frame)) => self.classify(frame).await,
            Ok(None) => {
                info!(url = %self.url, "broker connection closed");
                self.teardown().await;
                Received::Lost(None)
            }
            Err(TransportError::Protocol(e)) => {
                warn!(error = %e, "dropping malformed frame");
                Received::Ignored
            }
            Err(e) => {
                warn!(error = %e, "broker connection failed");
                self.teardown().await;
                Received::Lost(Some(e))
            }
        }
    }

    async fn classify(&mut self, frame: Frame) -> Received {
        match frame.command {
            Command::Message => {
                let header = frame.header("subscription").unwrap_or_default();
                let live = header
                    .parse::<SubscriptionId>()
                    .ok()
                    .and_then(|id| self.live.get(&id).map(|topic| (id, topic.clone())));
                match live {
                    Some((subscription, topic)) => Received::Delivery {
                        subscription,
                        topic,
                        body: frame.body,
                    },
                    None => {
                        debug!(subscription = header, "dropping stale delivery");
                        Received::Stale {
                            subscription: header.to_string(),
                        }
                    }
                }
            }
            Command::Error => {
                let message = error_message(&frame);
                warn!(message = %message, "broker rejected the session");
                self.teardown().await;
                Received::Rejected(message)
            }
            _ => Received::Ignored,
        }
    }
}

fn error_message(frame: &Frame) -> String {
    match frame.header("message") {
        Some(message) => message.to_string(),
        None if !frame.body.is_empty() => frame.body.clone(),
        None => "unspecified broker error".to_string(),
    }
}

/// Authority part of a WebSocket URL, used as the STOMP `host` header.
fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.split(['/', '?']).next().unwrap_or(rest)
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
