// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Desired subscriptions and the live handles serving them.
//!
//! The manager remembers what the user wants (the active thread, the
//! thread-update feed) separately from what is live on the broker, so
//! intents recorded while offline are applied on the next ready session.
//! Every (re)subscribe cancels its own prior handle first, which keeps at
//! most one live subscription per kind.

use hl_core::{Topic, Viewer};
use tracing::debug;

use crate::connection::{Connection, SubscriptionId};
use crate::transport::Transport;

/// Which feed a delivery belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionKind {
    Messages,
    Typing,
    ThreadUpdates,
}

#[derive(Debug, Default)]
pub struct SubscriptionManager {
    active_thread_id: Option<String>,
    want_thread_updates: bool,
    thread_updates_topic: Option<Topic>,
    messages: Option<SubscriptionId>,
    typing: Option<SubscriptionId>,
    thread_updates: Option<SubscriptionId>,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_thread_id(&self) -> Option<&str> {
        self.active_thread_id.as_deref()
    }

    pub fn wants_thread_updates(&self) -> bool {
        self.want_thread_updates
    }

    pub fn thread_updates_topic(&self) -> Option<&Topic> {
        self.thread_updates_topic.as_ref()
    }

    /// Makes `thread_id` the active thread.
    ///
    /// Returns `true` when new subscriptions were opened, in which case the
    /// caller clears its message buffer. While offline only the intent is
    /// recorded.
    pub fn subscribe_to_thread<T: Transport>(
        &mut self,
        conn: &mut Connection<T>,
        thread_id: &str,
    ) -> bool {
        self.active_thread_id = Some(thread_id.to_string());
        if !conn.is_connected() {
            debug!(thread = thread_id, "thread subscription deferred until ready");
            return false;
        }
        self.open_thread(conn, thread_id);
        true
    }

    /// Asks for the role-scoped thread-update feed.
    pub fn subscribe_to_thread_updates<T: Transport>(&mut self, conn: &mut Connection<T>) {
        self.want_thread_updates = true;
        if conn.is_connected() {
            self.open_thread_updates(conn);
        }
    }

    /// Picks the thread-update topic for `viewer`; `None` clears it.
    pub fn set_thread_updates_topic<T: Transport>(
        &mut self,
        conn: &mut Connection<T>,
        viewer: Option<&Viewer>,
    ) {
        let topic = viewer.map(Viewer::thread_updates_topic);
        if topic == self.thread_updates_topic {
            return;
        }
        self.thread_updates_topic = topic;
        if let Some(id) = self.thread_updates.take() {
            conn.unsubscribe(id);
        }
        if self.want_thread_updates && conn.is_connected() {
            self.open_thread_updates(conn);
        }
    }

    /// Re-issues every desired subscription on a freshly ready session.
    ///
    /// Returns `true` if the thread subscriptions were reopened.
    pub fn on_ready<T: Transport>(&mut self, conn: &mut Connection<T>) -> bool {
        for handle in [&mut self.messages, &mut self.typing, &mut self.thread_updates] {
            if handle.is_some_and(|id| !conn.is_live(id)) {
                *handle = None;
            }
        }
        if self.want_thread_updates {
            self.open_thread_updates(conn);
        }
        match self.active_thread_id.clone() {
            Some(thread_id) => {
                self.open_thread(conn, &thread_id);
                true
            }
            None => false,
        }
    }

    /// Forgets the active thread and cancels its subscriptions.
    pub fn leave_thread<T: Transport>(&mut self, conn: &mut Connection<T>) {
        self.active_thread_id = None;
        self.cancel_thread(conn);
    }

    /// Maps a delivery to the feed it belongs to; `None` means stale.
    pub fn route(&self, subscription: SubscriptionId) -> Option<SubscriptionKind> {
        if self.messages == Some(subscription) {
            Some(SubscriptionKind::Messages)
        } else if self.typing == Some(subscription) {
            Some(SubscriptionKind::Typing)
        } else if self.thread_updates == Some(subscription) {
            Some(SubscriptionKind::ThreadUpdates)
        } else {
            None
        }
    }

    /// Cancels everything and forgets every intent.
    pub fn reset<T: Transport>(&mut self, conn: &mut Connection<T>) {
        self.cancel_thread(conn);
        if let Some(id) = self.thread_updates.take() {
            conn.unsubscribe(id);
        }
        *self = SubscriptionManager::default();
    }

    fn open_thread<T: Transport>(&mut self, conn: &mut Connection<T>, thread_id: &str) {
        self.cancel_thread(conn);
        self.messages = conn.subscribe(Topic::ThreadMessages(thread_id.to_string()));
        self.typing = conn.subscribe(Topic::ThreadTyping(thread_id.to_string()));
    }

    fn cancel_thread<T: Transport>(&mut self, conn: &mut Connection<T>) {
        if let Some(id) = self.messages.take() {
            conn.unsubscribe(id);
        }
        if let Some(id) = self.typing.take() {
            conn.unsubscribe(id);
        }
    }

    fn open_thread_updates<T: Transport>(&mut self, conn: &mut Connection<T>) {
        if let Some(id) = self.thread_updates.take() {
            conn.unsubscribe(id);
        }
        if let Some(topic) = &self.thread_updates_topic {
            self.thread_updates = conn.subscribe(topic.clone());
        }
    }
}

#[cfg(test)]
#[path = "subscriptions_tests.rs"]
mod tests;
