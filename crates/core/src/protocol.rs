// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Broker destinations used by the support chat.
//!
//! The server pushes on `/topic/...` destinations and accepts client
//! publications on `/app/...` destinations:
//! - `/topic/threads/{id}` carries [`ChatMessage`](crate::ChatMessage)s
//! - `/topic/threads/{id}/typing` carries [`TypingEvent`](crate::TypingEvent)s
//! - `/topic/threads` and `/topic/users/{id}/threads` carry
//!   [`ThreadItem`](crate::ThreadItem) updates

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An inbound topic the client can subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Messages posted into one thread.
    ThreadMessages(String),
    /// Typing signals for one thread.
    ThreadTyping(String),
    /// Every thread update (support agents).
    AllThreads,
    /// Updates to one customer's threads.
    UserThreads(String),
}

impl Topic {
    /// Id of the thread this topic is scoped to, if any.
    pub fn thread_id(&self) -> Option<&str> {
        match self {
            Topic::ThreadMessages(id) | Topic::ThreadTyping(id) => Some(id),
            Topic::AllThreads | Topic::UserThreads(_) => None,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::ThreadMessages(id) => write!(f, "/topic/threads/{}", id),
            Topic::ThreadTyping(id) => write!(f, "/topic/threads/{}/typing", id),
            Topic::AllThreads => write!(f, "/topic/threads"),
            Topic::UserThreads(user_id) => write!(f, "/topic/users/{}/threads", user_id),
        }
    }
}

impl FromStr for Topic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let segments: Vec<&str> = s
            .strip_prefix("/topic/")
            .ok_or_else(|| Error::UnknownTopic(s.to_string()))?
            .split('/')
            .collect();

        match segments.as_slice() {
            ["threads"] => Ok(Topic::AllThreads),
            ["threads", id] if !id.is_empty() => Ok(Topic::ThreadMessages(id.to_string())),
            ["threads", id, "typing"] if !id.is_empty() => Ok(Topic::ThreadTyping(id.to_string())),
            ["users", user_id, "threads"] if !user_id.is_empty() => {
                Ok(Topic::UserThreads(user_id.to_string()))
            }
            _ => Err(Error::UnknownTopic(s.to_string())),
        }
    }
}

/// An application destination the client publishes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    ChatSend,
    ChatTyping,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::ChatSend => "/app/chat.send",
            Destination::ChatTyping => "/app/chat.typing",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Body published to [`Destination::ChatSend`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub content: String,
    pub thread_id: String,
}

impl OutgoingMessage {
    pub fn new(content: impl Into<String>, thread_id: impl Into<String>) -> Self {
        OutgoingMessage {
            content: content.into(),
            thread_id: thread_id.into(),
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Body published to [`Destination::ChatTyping`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingSignal {
    pub thread_id: String,
    pub typing: bool,
}

impl TypingSignal {
    pub fn started(thread_id: impl Into<String>) -> Self {
        TypingSignal {
            thread_id: thread_id.into(),
            typing: true,
        }
    }

    pub fn stopped(thread_id: impl Into<String>) -> Self {
        TypingSignal {
            thread_id: thread_id.into(),
            typing: false,
        }
    }

    /// Serializes the signal to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
