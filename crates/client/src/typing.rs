// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typing indicators.
//!
//! [`TypingDebounce`] decides when the local user's `typing` signal goes
//! out. [`RemoteTypers`] tracks who else is typing in the selected thread.

use std::time::Duration;

use hl_core::{TypingEvent, TypingSignal};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Fired by the debounce timer. Carries the arming generation so a timer
/// that lost a race with a rearm or stop is recognised and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingExpired {
    generation: u64,
}

/// Debounce for the local `typing` signal.
///
/// Every input rearms a single timer. When it fires without further input,
/// the owner feeds the event back through [`TypingDebounce::expired`] and
/// publishes the returned `typing=false`.
pub struct TypingDebounce {
    debounce: Duration,
    typing_thread: Option<String>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
    expired_tx: mpsc::UnboundedSender<TypingExpired>,
}

impl TypingDebounce {
    /// Creates the engine and the receiver its timer fires into.
    pub fn new(debounce: Duration) -> (Self, mpsc::UnboundedReceiver<TypingExpired>) {
        let (expired_tx, expired_rx) = mpsc::unbounded_channel();
        let engine = TypingDebounce {
            debounce,
            typing_thread: None,
            generation: 0,
            timer: None,
            expired_tx,
        };
        (engine, expired_rx)
    }

    pub fn is_typing(&self) -> bool {
        self.typing_thread.is_some()
    }

    pub fn typing_thread(&self) -> Option<&str> {
        self.typing_thread.as_deref()
    }

    /// Records one keystroke in `thread_id` and returns the signals to publish.
    ///
    /// `typing=true` goes out only when typing starts; moving to another
    /// thread stops the previous one first.
    pub fn input(&mut self, thread_id: &str) -> Vec<TypingSignal> {
        let mut signals = Vec::new();
        if self.typing_thread.as_deref() != Some(thread_id) {
            if let Some(previous) = self.typing_thread.take() {
                signals.push(TypingSignal::stopped(previous));
            }
            signals.push(TypingSignal::started(thread_id));
            self.typing_thread = Some(thread_id.to_string());
        }
        self.arm();
        signals
    }

    /// Stops typing now. Returns `typing=false` if a signal was active.
    pub fn stop(&mut self) -> Option<TypingSignal> {
        self.disarm();
        self.typing_thread.take().map(TypingSignal::stopped)
    }

    /// Handles a timer fire. Late fires from a replaced timer yield nothing.
    pub fn expired(&mut self, fired: TypingExpired) -> Option<TypingSignal> {
        if fired.generation != self.generation || self.timer.is_none() {
            return None;
        }
        self.timer = None;
        self.typing_thread.take().map(TypingSignal::stopped)
    }

    fn arm(&mut self) {
        self.disarm();
        let generation = self.generation;
        let debounce = self.debounce;
        let tx = self.expired_tx.clone();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let _ = tx.send(TypingExpired { generation });
        }));
    }

    fn disarm(&mut self) {
        self.generation += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for TypingDebounce {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Other participants currently typing in the selected thread.
///
/// Kept in the order they started typing. There is no remote timeout: an
/// entry stays until a `typing=false` event or a reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteTypers {
    entries: Vec<(String, String)>,
}

impl RemoteTypers {
    /// Applies an event. Events for other threads and the local user's own
    /// events are ignored. Returns `true` if the set changed.
    pub fn apply(
        &mut self,
        event: &TypingEvent,
        selected_thread: Option<&str>,
        local_user: Option<&str>,
    ) -> bool {
        if selected_thread != Some(event.thread_id.as_str()) {
            return false;
        }
        if local_user == Some(event.sender_user_id.as_str()) {
            return false;
        }

        let position = self
            .entries
            .iter()
            .position(|(id, _)| *id == event.sender_user_id);
        match (event.typing, position) {
            (true, Some(i)) => {
                let label = event.sender_label();
                if self.entries[i].1 == label {
                    return false;
                }
                self.entries[i].1 = label.to_string();
                true
            }
            (true, None) => {
                self.entries.push((
                    event.sender_user_id.clone(),
                    event.sender_label().to_string(),
                ));
                true
            }
            (false, Some(i)) => {
                self.entries.remove(i);
                true
            }
            (false, None) => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Display labels in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, label)| label.as_str())
    }

    /// `""`, `"A is typing…"` or `"A, B are typing…"`.
    pub fn label(&self) -> String {
        match self.entries.as_slice() {
            [] => String::new(),
            [(_, only)] => format!("{} is typing…", only),
            _ => format!("{} are typing…", self.names().collect::<Vec<_>>().join(", ")),
        }
    }
}

#[cfg(test)]
#[path = "typing_tests.rs"]
mod tests;
