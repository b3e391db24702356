// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Records exchanged with the support chat server.
//!
//! Field names follow the server's camelCase JSON. Timestamps are kept as the
//! ISO strings the server sends; nothing here does date arithmetic.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Picks the label shown for a participant: name, then email, then raw id.
///
/// Blank names and emails are skipped.
pub fn display_label<'a>(name: Option<&'a str>, email: Option<&'a str>, id: &'a str) -> &'a str {
    name.filter(|n| !n.trim().is_empty())
        .or_else(|| email.filter(|e| !e.trim().is_empty()))
        .unwrap_or(id)
}

/// A chat message delivered on a thread topic or loaded from history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub content: String,
    pub sent_at: String,
    pub thread_id: String,
    pub sender_user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_email: Option<String>,
}

impl ChatMessage {
    /// Label for the message author.
    pub fn sender_label(&self) -> &str {
        display_label(
            self.sender_name.as_deref(),
            self.sender_email.as_deref(),
            &self.sender_user_id,
        )
    }
}

/// Lifecycle status of a thread.
///
/// The server only distinguishes closed threads from everything else, so
/// unknown statuses are kept verbatim and treated as open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ThreadStatus {
    Open,
    Closed,
    Other(String),
}

impl ThreadStatus {
    /// Returns the string representation used on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            ThreadStatus::Open => "OPEN",
            ThreadStatus::Closed => "CLOSED",
            ThreadStatus::Other(s) => s,
        }
    }

    /// Closed threads accept no further messages.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ThreadStatus::Closed)
    }
}

impl From<String> for ThreadStatus {
    fn from(s: String) -> Self {
        if s.eq_ignore_ascii_case("closed") {
            ThreadStatus::Closed
        } else if s.eq_ignore_ascii_case("open") {
            ThreadStatus::Open
        } else {
            ThreadStatus::Other(s)
        }
    }
}

impl From<ThreadStatus> for String {
    fn from(status: ThreadStatus) -> Self {
        match status {
            ThreadStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A support ticket as listed by the server and pushed on thread-update topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadItem {
    pub id: String,
    pub subject: String,
    pub status: ThreadStatus,
    pub created_at: String,
    pub created_by_user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_support_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_support_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_support_email: Option<String>,
}

impl ThreadItem {
    pub fn is_closed(&self) -> bool {
        self.status.is_terminal()
    }

    /// True when a support agent has claimed the thread.
    pub fn is_assigned(&self) -> bool {
        self.assigned_support_user_id
            .as_deref()
            .is_some_and(|id| !id.is_empty())
    }

    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assigned_support_user_id.as_deref() == Some(user_id)
    }

    /// Label for the customer who opened the thread.
    pub fn creator_label(&self) -> &str {
        display_label(
            self.created_by_name.as_deref(),
            self.created_by_email.as_deref(),
            &self.created_by_user_id,
        )
    }

    /// Label for the assigned agent, if any.
    pub fn assignee_label(&self) -> Option<&str> {
        self.assigned_support_user_id.as_deref().map(|id| {
            display_label(
                self.assigned_support_name.as_deref(),
                self.assigned_support_email.as_deref(),
                id,
            )
        })
    }
}

/// A remote participant started or stopped typing in a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingEvent {
    pub thread_id: String,
    pub sender_user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_email: Option<String>,
    pub typing: bool,
}

impl TypingEvent {
    pub fn sender_label(&self) -> &str {
        display_label(
            self.sender_name.as_deref(),
            self.sender_email.as_deref(),
            &self.sender_user_id,
        )
    }
}

/// A car rental reservation a customer can attach to a new ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationItem {
    pub id: String,
    pub start_at: String,
    pub end_at: String,
    pub status: String,
    pub total_price_cents: i64,
    pub currency: String,
    pub car_category_code: String,
}

impl ReservationItem {
    /// Human-readable vehicle category.
    pub fn category_label(&self) -> &str {
        match self.car_category_code.as_str() {
            "VAN6" => "6-seat car",
            "SED4" => "4-seat car",
            other => other,
        }
    }
}

/// A support agent a ticket can be transferred to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportAgent {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl SupportAgent {
    pub fn label(&self) -> &str {
        display_label(self.name.as_deref(), self.email.as_deref(), &self.id)
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
