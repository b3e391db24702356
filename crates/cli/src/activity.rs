// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Turns successive chat snapshots into human-readable activity lines.

use std::collections::{HashMap, HashSet};

use hl_client::{ChatState, ConnectionState, Notice};
use hl_core::ThreadItem;

/// Remembers what was last reported so each change is logged once.
#[derive(Debug, Default)]
pub struct ActivityLog {
    connection: Option<ConnectionState>,
    threads: HashMap<String, ThreadItem>,
    selected: Option<String>,
    messages: usize,
    typing: String,
    notice: Option<Notice>,
}

impl ActivityLog {
    /// Returns one line per change since the previous snapshot.
    pub fn observe(&mut self, state: &ChatState) -> Vec<String> {
        let mut lines = Vec::new();

        if self.connection != Some(state.connection) {
            self.connection = Some(state.connection);
            lines.push(format!("connection {}", state.connection));
        }

        self.observe_threads(state, &mut lines);

        let selected = state.selected_id().map(str::to_string);
        if selected != self.selected {
            lines.push(match &selected {
                Some(id) => format!("selected {}", id),
                None => "selection cleared".to_string(),
            });
            self.selected = selected;
            self.messages = 0;
        }

        // The buffer is cleared on reconnect and on selection change.
        if state.messages.len() < self.messages {
            self.messages = 0;
        }
        for message in state.messages.iter().skip(self.messages) {
            lines.push(format!(
                "[{}] {}: {}",
                message.thread_id,
                message.sender_label(),
                message.content
            ));
        }
        self.messages = state.messages.len();

        let typing = state.typing_label();
        if typing != self.typing {
            if !typing.is_empty() {
                lines.push(typing.clone());
            }
            self.typing = typing;
        }

        if state.notice != self.notice {
            if let Some(notice) = &state.notice {
                lines.push(notice.to_string());
            }
            self.notice = state.notice.clone();
        }

        lines
    }

    fn observe_threads(&mut self, state: &ChatState, lines: &mut Vec<String>) {
        let mut seen = HashSet::new();
        for thread in &state.threads {
            seen.insert(thread.id.as_str());
            match self.threads.get(&thread.id) {
                None => lines.push(format!("thread {}", describe(thread))),
                Some(known) if known != thread => {
                    lines.push(format!("updated {}", describe(thread)))
                }
                Some(_) => {}
            }
        }

        let mut removed: Vec<&String> = self
            .threads
            .keys()
            .filter(|id| !seen.contains(id.as_str()))
            .collect();
        removed.sort();
        for id in removed {
            lines.push(format!("removed {}", id));
        }

        self.threads = state
            .threads
            .iter()
            .map(|t| (t.id.clone(), t.clone()))
            .collect();
    }
}

/// `id [STATUS] subject (assignee)`
pub fn describe(thread: &ThreadItem) -> String {
    format!(
        "{} [{}] {} ({})",
        thread.id,
        thread.status.as_str(),
        thread.subject,
        thread.assignee_label().unwrap_or("unassigned")
    )
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
