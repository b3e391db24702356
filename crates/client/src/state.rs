// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The aggregate chat state broadcast to readers.

use std::fmt;

use hl_core::{ChatMessage, ReservationItem, SupportAgent, ThreadItem, Viewer};

use crate::api::Operation;
use crate::connection::ConnectionState;
use crate::typing::RemoteTypers;
use crate::view::{FilterCounts, ThreadFilter};

/// Something the user should be told about once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A REST call failed.
    OperationFailed(Operation),
    /// The broker refused or ended the session.
    Rejected(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::OperationFailed(operation) => write!(f, "{} failed", operation),
            Notice::Rejected(message) => write!(f, "broker rejected the session: {}", message),
        }
    }
}

/// Everything a reader needs to render the chat.
///
/// Owned by the session and mutated only by its handlers; readers get
/// clones through a watch channel.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    pub connection: ConnectionState,
    pub viewer: Option<Viewer>,
    /// Most recently updated first. Ids are unique.
    pub threads: Vec<ThreadItem>,
    pub selected: Option<ThreadItem>,
    /// Messages of the selected thread only.
    pub messages: Vec<ChatMessage>,
    pub typers: RemoteTypers,
    pub filter: ThreadFilter,
    pub reservations: Vec<ReservationItem>,
    /// Agents a ticket can be transferred to; never includes the viewer.
    pub support_agents: Vec<SupportAgent>,
    /// Set when the buffer was cleared and history has not been reloaded.
    pub history_pending: bool,
    pub notice: Option<Notice>,
}

impl ChatState {
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|t| t.id.as_str())
    }

    pub fn local_user_id(&self) -> Option<&str> {
        self.viewer.as_ref().map(Viewer::user_id)
    }

    pub fn typing_label(&self) -> String {
        self.typers.label()
    }

    /// Threads passing the active filter, in list order.
    pub fn visible_threads(&self) -> Vec<&ThreadItem> {
        self.filter.apply(&self.threads)
    }

    pub fn counts(&self) -> FilterCounts {
        FilterCounts::of(&self.threads)
    }

    pub fn thread(&self, id: &str) -> Option<&ThreadItem> {
        self.threads.iter().find(|t| t.id == id)
    }

    /// Whether the viewer may post into the selected thread.
    pub fn can_send(&self) -> bool {
        match (&self.viewer, &self.selected) {
            (Some(viewer), Some(thread)) => viewer.can_send_into(thread),
            _ => false,
        }
    }

    /// Clears the selection with its message buffer and typing indicators.
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.messages.clear();
        self.typers.clear();
        self.history_pending = false;
    }
}
