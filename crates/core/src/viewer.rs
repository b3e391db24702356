// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The signed-in user and the role rules that scope what they can see and do.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::ThreadItem;
use crate::protocol::Topic;

/// Who is looking at the thread list.
///
/// Customers only ever receive their own threads; support agents see the
/// shared queue minus threads claimed by other agents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Viewer {
    Client {
        #[serde(rename = "userId")]
        user_id: String,
    },
    Support {
        #[serde(rename = "userId")]
        user_id: String,
    },
}

impl Viewer {
    pub fn client(user_id: impl Into<String>) -> Self {
        Viewer::Client {
            user_id: user_id.into(),
        }
    }

    pub fn support(user_id: impl Into<String>) -> Self {
        Viewer::Support {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            Viewer::Client { user_id } | Viewer::Support { user_id } => user_id,
        }
    }

    pub fn is_support(&self) -> bool {
        matches!(self, Viewer::Support { .. })
    }

    /// Whether this viewer may keep `thread` in their local list.
    pub fn can_see(&self, thread: &ThreadItem) -> bool {
        match self {
            Viewer::Support { user_id } => match thread.assigned_support_user_id.as_deref() {
                Some(assigned) if !assigned.is_empty() => assigned == user_id,
                _ => true,
            },
            // The server only pushes a customer's own threads.
            Viewer::Client { .. } => true,
        }
    }

    /// Whether this viewer may post messages (and typing signals) into `thread`.
    pub fn can_send_into(&self, thread: &ThreadItem) -> bool {
        if thread.is_closed() {
            return false;
        }
        match self {
            Viewer::Support { user_id } => thread.is_assigned_to(user_id),
            Viewer::Client { .. } => true,
        }
    }

    /// The role-scoped feed of thread updates for this viewer.
    pub fn thread_updates_topic(&self) -> Topic {
        match self {
            Viewer::Support { .. } => Topic::AllThreads,
            Viewer::Client { user_id } => Topic::UserThreads(user_id.clone()),
        }
    }

    pub fn role_str(&self) -> &'static str {
        match self {
            Viewer::Client { .. } => "CLIENT",
            Viewer::Support { .. } => "SUPPORT",
        }
    }
}

impl fmt::Display for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role_str(), self.user_id())
    }
}

#[cfg(test)]
#[path = "viewer_tests.rs"]
mod tests;
