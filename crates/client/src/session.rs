// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The chat session: composition root and event loop.
//!
//! A [`ChatSession`] owns the connection, the subscription manager, the
//! typing debounce and the aggregate [`ChatState`]. Every state change is
//! published on a watch channel; readers hold a [`watch::Receiver`] and
//! always see the latest state.
//!
//! All mutation happens in handlers that run to completion: a user
//! command, a broker frame, a typing-timer fire or the reconnect timer.
//! [`ChatSession::run`] drives them from one `select!` loop, so no locks
//! guard the state.

use hl_core::{
    ChatMessage, Destination, OutgoingMessage, ReservationItem, SupportAgent, ThreadItem,
    TypingEvent, TypingSignal, Viewer,
};
use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::Operation;
use crate::config::ClientConfig;
use crate::connection::{Connection, ConnectionState, Received};
use crate::error::{ClientError, ClientResult};
use crate::reconciler::{self, Reconciled};
use crate::state::{ChatState, Notice};
use crate::subscriptions::{SubscriptionKind, SubscriptionManager};
use crate::transport::{Transport, WebSocketTransport};
use crate::typing::{TypingDebounce, TypingExpired};
use crate::view::{self, ThreadFilter};

/// Requests a [`ChatSession::run`] loop accepts.
#[derive(Debug)]
pub enum SessionCommand {
    Login { viewer: Viewer, token: String },
    Logout,
    Connect,
    Disconnect,
    SelectThread(ThreadItem),
    TypingInput,
    SendMessage(String),
    SetFilter(ThreadFilter),
    ThreadsLoaded(Vec<ThreadItem>),
    HistoryLoaded {
        thread_id: String,
        messages: Vec<ChatMessage>,
    },
    ThreadChanged(ThreadItem),
    ReservationsLoaded(Vec<ReservationItem>),
    AgentsLoaded(Vec<SupportAgent>),
    OperationFailed(Operation),
}

/// Real-time chat session over a broker transport.
pub struct ChatSession<T: Transport = WebSocketTransport> {
    config: ClientConfig,
    connection: Connection<T>,
    subscriptions: SubscriptionManager,
    typing: TypingDebounce,
    typing_rx: mpsc::UnboundedReceiver<TypingExpired>,
    token: Option<String>,
    reconnect_at: Option<Instant>,
    state: ChatState,
    updates: watch::Sender<ChatState>,
}

impl ChatSession<WebSocketTransport> {
    /// Creates a session using the WebSocket transport.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        Ok(Self::with_transport(config, WebSocketTransport::new()))
    }
}

impl<T: Transport> ChatSession<T> {
    /// Creates a session with a custom transport (for testing).
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let connection = Connection::new(config.url.clone(), config.connect_timeout(), transport);
        let (typing, typing_rx) = TypingDebounce::new(config.typing_debounce());
        let (updates, _) = watch::channel(ChatState::default());
        ChatSession {
            config,
            connection,
            subscriptions: SubscriptionManager::new(),
            typing,
            typing_rx,
            token: None,
            reconnect_at: None,
            state: ChatState::default(),
            updates,
        }
    }

    /// Subscribes to state changes.
    pub fn watch(&self) -> watch::Receiver<ChatState> {
        self.updates.subscribe()
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// When the next reconnect attempt is due, if one is scheduled.
    pub fn reconnect_at(&self) -> Option<Instant> {
        self.reconnect_at
    }

    /// Signs in: picks the thread-update feed for `viewer` and connects.
    ///
    /// Signing in as someone else first logs the previous viewer out.
    pub async fn login(&mut self, viewer: Viewer, token: String) -> ClientResult<()> {
        if self.state.viewer.as_ref().is_some_and(|v| *v != viewer) {
            self.reset().await;
        }
        info!(viewer = %viewer, "login");
        self.token = Some(token);
        self.subscriptions
            .set_thread_updates_topic(&mut self.connection, Some(&viewer));
        self.subscriptions
            .subscribe_to_thread_updates(&mut self.connection);
        self.state.viewer = Some(viewer);
        let result = self.open().await;
        self.settle().await;
        result
    }

    /// Signs out and resets every component to its empty state.
    pub async fn logout(&mut self) {
        info!("logout");
        self.reset().await;
        self.settle().await;
    }

    /// Connects with the stored credential. No-op when already connected.
    pub async fn connect(&mut self) -> ClientResult<()> {
        let result = self.open().await;
        self.settle().await;
        result
    }

    /// Disconnects and empties the subscriptions and the chat state.
    ///
    /// The credential and viewer are kept; `login` starts over. No
    /// reconnect is scheduled.
    pub async fn disconnect(&mut self) {
        self.clear().await;
        self.settle().await;
    }

    /// Selects `thread`: clears the buffer and subscribes to its feeds.
    pub async fn select_thread(&mut self, thread: ThreadItem) {
        self.select(thread);
        self.settle().await;
    }

    /// Records a keystroke in the selected thread.
    pub async fn typing_input(&mut self) {
        self.on_typing_input();
        self.settle().await;
    }

    /// Sends `content` into the selected thread.
    ///
    /// Returns `Ok(false)` when nothing was sent: blank content, no
    /// selection, a thread the viewer may not post into, or no connection.
    pub async fn send_message(&mut self, content: &str) -> ClientResult<bool> {
        let result = self.send(content);
        self.settle().await;
        result
    }

    /// Toggles the list filter.
    pub async fn set_filter(&mut self, filter: ThreadFilter) {
        self.apply_filter(filter);
        self.settle().await;
    }

    /// Executes one command.
    pub async fn execute(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Login { viewer, token } => {
                if let Err(e) = self.login(viewer, token).await {
                    warn!(error = %e, "login failed to connect");
                }
                return;
            }
            SessionCommand::Logout => {
                self.logout().await;
                return;
            }
            SessionCommand::Connect => {
                if let Err(e) = self.connect().await {
                    warn!(error = %e, "connect failed");
                }
                return;
            }
            SessionCommand::Disconnect => {
                self.disconnect().await;
                return;
            }
            SessionCommand::SelectThread(thread) => self.select(thread),
            SessionCommand::TypingInput => self.on_typing_input(),
            SessionCommand::SendMessage(content) => {
                if let Err(e) = self.send(&content) {
                    warn!(error = %e, "message not sent");
                }
            }
            SessionCommand::SetFilter(filter) => self.apply_filter(filter),
            SessionCommand::ThreadsLoaded(threads) => self.threads_loaded(threads),
            SessionCommand::HistoryLoaded {
                thread_id,
                messages,
            } => self.history_loaded(&thread_id, messages),
            SessionCommand::ThreadChanged(thread) => self.thread_changed(thread),
            SessionCommand::ReservationsLoaded(reservations) => {
                self.reservations_loaded(reservations)
            }
            SessionCommand::AgentsLoaded(agents) => self.agents_loaded(agents),
            SessionCommand::OperationFailed(operation) => self.operation_failed(operation),
        }
        self.settle().await;
    }

    /// Replaces the thread list with a REST listing.
    pub fn threads_loaded(&mut self, threads: Vec<ThreadItem>) {
        let Some(viewer) = self.state.viewer.clone() else {
            debug!("thread listing without viewer ignored");
            return;
        };
        let dropped = reconciler::seed(&mut self.state, &viewer, threads);
        if dropped {
            self.selection_dropped();
        } else if self.state.selected.as_ref().is_some_and(ThreadItem::is_closed) {
            self.stop_typing();
        }
    }

    /// Installs message history, unless the user moved on meanwhile.
    pub fn history_loaded(&mut self, thread_id: &str, messages: Vec<ChatMessage>) {
        if self.state.selected_id() != Some(thread_id) {
            debug!(thread = thread_id, "history for unselected thread ignored");
            return;
        }
        self.state.messages = messages;
        self.state.history_pending = false;
    }

    /// Merges a thread returned by a REST mutation.
    pub fn thread_changed(&mut self, thread: ThreadItem) {
        let Some(viewer) = self.state.viewer.clone() else {
            return;
        };
        let outcome = reconciler::apply_update(&mut self.state, &viewer, thread);
        self.reconciled(outcome);
    }

    pub fn reservations_loaded(&mut self, reservations: Vec<ReservationItem>) {
        self.state.reservations = reservations;
    }

    /// Stores transfer targets, leaving out the viewer.
    pub fn agents_loaded(&mut self, agents: Vec<SupportAgent>) {
        let me = self.state.local_user_id().map(str::to_string);
        self.state.support_agents = agents
            .into_iter()
            .filter(|a| Some(a.id.as_str()) != me.as_deref())
            .collect();
    }

    pub fn operation_failed(&mut self, operation: Operation) {
        warn!(operation = %operation, "operation failed");
        self.state.notice = Some(Notice::OperationFailed(operation));
    }

    /// Applies one broker frame.
    pub async fn handle(&mut self, received: Received) {
        match received {
            Received::Delivery {
                subscription,
                topic,
                body,
            } => match self.subscriptions.route(subscription) {
                Some(SubscriptionKind::Messages) => self.on_message(&body),
                Some(SubscriptionKind::Typing) => self.on_typing_event(&body),
                Some(SubscriptionKind::ThreadUpdates) => self.on_thread_update(&body),
                None => debug!(subscription = %subscription, topic = %topic, "unrouted delivery dropped"),
            },
            Received::Stale { subscription } => {
                debug!(subscription = %subscription, "stale delivery dropped");
            }
            Received::Rejected(message) => {
                self.typing.stop();
                self.reconnect_at = None;
                self.state.typers.clear();
                self.state.notice = Some(Notice::Rejected(message));
            }
            Received::Lost(error) => {
                if let Some(e) = error {
                    debug!(error = %e, "connection lost");
                }
                self.connection_lost();
            }
            Received::Ignored => {}
        }
        self.settle().await;
    }

    /// Handles a typing-timer fire.
    pub async fn typing_expired(&mut self, fired: TypingExpired) {
        if let Some(signal) = self.typing.expired(fired) {
            self.publish_typing(signal);
        }
        self.settle().await;
    }

    /// Attempts the scheduled reconnect.
    pub async fn reconnect(&mut self) {
        self.reconnect_at = None;
        if let Err(e) = self.connect().await {
            warn!(error = %e, "reconnect failed");
        }
    }

    /// Drives the session until `shutdown` fires or every command sender
    /// is dropped, then disconnects.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
        shutdown: CancellationToken,
    ) {
        loop {
            let connected = self.connection.is_connected();
            let reconnect_at = self.reconnect_at;

            tokio::select! {
                _ = shutdown.cancelled() => break,

                command = commands.recv() => match command {
                    Some(command) => self.execute(command).await,
                    None => break,
                },

                received = self.connection.recv(), if connected => {
                    self.handle(received).await;
                }

                Some(fired) = self.typing_rx.recv() => {
                    self.typing_expired(fired).await;
                }

                _ = sleep_until(reconnect_at), if reconnect_at.is_some() => {
                    self.reconnect().await;
                }
            }
        }

        self.disconnect().await;
        info!("chat session stopped");
    }

    async fn open(&mut self) -> ClientResult<()> {
        let token = self.token.clone().ok_or(ClientError::NoCredential)?;
        self.reconnect_at = None;
        self.state.connection = ConnectionState::Connecting;
        self.publish();

        match self.connection.connect(&token).await {
            Ok(true) => {
                self.state.notice = None;
                if self.subscriptions.on_ready(&mut self.connection) {
                    self.state.messages.clear();
                    self.state.typers.clear();
                    self.state.history_pending = self.state.selected.is_some();
                }
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(ClientError::Rejected(message)) => {
                warn!(message = %message, "broker rejected the session");
                self.state.notice = Some(Notice::Rejected(message.clone()));
                Err(ClientError::Rejected(message))
            }
            Err(e) => {
                self.schedule_reconnect();
                Err(e)
            }
        }
    }

    async fn reset(&mut self) {
        self.clear().await;
        self.token = None;
        self.state.viewer = None;
    }

    async fn clear(&mut self) {
        self.stop_typing();
        self.subscriptions.reset(&mut self.connection);
        self.connection.disconnect().await;
        self.reconnect_at = None;
        self.state = ChatState {
            viewer: self.state.viewer.take(),
            ..ChatState::default()
        };
    }

    fn select(&mut self, thread: ThreadItem) {
        self.stop_typing();
        debug!(thread = %thread.id, "select thread");
        let thread_id = thread.id.clone();
        self.state.selected = Some(thread);
        self.state.messages.clear();
        self.state.typers.clear();
        self.state.history_pending = true;
        self.subscriptions
            .subscribe_to_thread(&mut self.connection, &thread_id);
    }

    fn on_typing_input(&mut self) {
        if !self.state.can_send() || !self.connection.is_connected() {
            return;
        }
        let Some(thread_id) = self.state.selected_id().map(str::to_string) else {
            return;
        };
        for signal in self.typing.input(&thread_id) {
            self.publish_typing(signal);
        }
    }

    fn send(&mut self, content: &str) -> ClientResult<bool> {
        let content = content.trim();
        if content.is_empty() || !self.state.can_send() || !self.connection.is_connected() {
            return Ok(false);
        }
        let Some(thread_id) = self.state.selected_id() else {
            return Ok(false);
        };
        let body = OutgoingMessage::new(content, thread_id).to_json()?;
        let sent = self.connection.publish(Destination::ChatSend, body);
        self.stop_typing();
        Ok(sent)
    }

    fn apply_filter(&mut self, filter: ThreadFilter) {
        self.state.filter = self.state.filter.toggle(filter);
        if view::sync_selection(&mut self.state) {
            self.selection_dropped();
        }
    }

    fn on_message(&mut self, body: &str) {
        let Some(message) = parse::<ChatMessage>(body, "message") else {
            return;
        };
        if self.state.selected_id() == Some(message.thread_id.as_str()) {
            self.state.messages.push(message);
        } else {
            debug!(thread = %message.thread_id, "message for unselected thread dropped");
        }
    }

    fn on_typing_event(&mut self, body: &str) {
        let Some(event) = parse::<TypingEvent>(body, "typing event") else {
            return;
        };
        let selected = self.state.selected.as_ref().map(|t| t.id.as_str());
        let me = self.state.viewer.as_ref().map(Viewer::user_id);
        self.state.typers.apply(&event, selected, me);
    }

    fn on_thread_update(&mut self, body: &str) {
        if let Some(thread) = parse::<ThreadItem>(body, "thread update") {
            self.thread_changed(thread);
        }
    }

    fn reconciled(&mut self, outcome: Reconciled) {
        if outcome.selection_dropped() {
            self.selection_dropped();
        } else if outcome.stops_typing() {
            self.stop_typing();
        }
    }

    fn selection_dropped(&mut self) {
        self.stop_typing();
        self.subscriptions.leave_thread(&mut self.connection);
    }

    fn connection_lost(&mut self) {
        self.typing.stop();
        self.state.typers.clear();
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        if self.token.is_none() {
            return;
        }
        let delay = self.config.reconnect_delay();
        info!(delay_ms = delay.as_millis() as u64, "reconnect scheduled");
        self.reconnect_at = Some(Instant::now() + delay);
    }

    fn stop_typing(&mut self) {
        if let Some(signal) = self.typing.stop() {
            self.publish_typing(signal);
        }
    }

    fn publish_typing(&mut self, signal: TypingSignal) {
        match signal.to_json() {
            Ok(body) => {
                self.connection.publish(Destination::ChatTyping, body);
            }
            Err(e) => warn!(error = %e, "typing signal not encoded"),
        }
    }

    /// Flushes queued frames and publishes the state.
    async fn settle(&mut self) {
        if self.connection.flush().await.is_err() {
            self.connection_lost();
        }
        self.state.connection = self.connection.state();
        self.publish();
    }

    fn publish(&self) {
        self.updates.send_replace(self.state.clone());
    }
}

fn parse<T: DeserializeOwned>(body: &str, what: &str) -> Option<T> {
    match serde_json::from_str(body) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "dropping malformed {}", what);
            None
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
