// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fixture builders shared by the client tests.

#![allow(clippy::unwrap_used)]

use hl_core::{ChatMessage, ThreadItem, ThreadStatus, TypingEvent};

/// An unassigned, open thread created by `user-1`.
pub fn thread(id: &str) -> ThreadItem {
    ThreadItem {
        id: id.to_string(),
        subject: format!("Subject {}", id),
        status: ThreadStatus::Other("PENDING".to_string()),
        created_at: "2026-03-01T10:00:00Z".to_string(),
        created_by_user_id: "user-1".to_string(),
        created_by_name: Some("Alice".to_string()),
        created_by_email: None,
        reservation_id: None,
        assigned_support_user_id: None,
        assigned_support_name: None,
        assigned_support_email: None,
    }
}

pub fn assigned(id: &str, agent: &str) -> ThreadItem {
    ThreadItem {
        status: ThreadStatus::Open,
        assigned_support_user_id: Some(agent.to_string()),
        ..thread(id)
    }
}

pub fn closed(id: &str, agent: &str) -> ThreadItem {
    ThreadItem {
        status: ThreadStatus::Closed,
        ..assigned(id, agent)
    }
}

pub fn message(thread_id: &str, sender: &str, content: &str) -> ChatMessage {
    ChatMessage {
        content: content.to_string(),
        sent_at: "2026-03-01T10:05:00Z".to_string(),
        thread_id: thread_id.to_string(),
        sender_user_id: sender.to_string(),
        sender_name: None,
        sender_email: None,
    }
}

pub fn typing(thread_id: &str, sender: &str, name: Option<&str>, typing: bool) -> TypingEvent {
    TypingEvent {
        thread_id: thread_id.to_string(),
        sender_user_id: sender.to_string(),
        sender_name: name.map(str::to_string),
        sender_email: None,
        typing,
    }
}

pub fn json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap()
}
