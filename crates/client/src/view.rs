// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Thread list filtering and selection consistency.

use std::fmt;
use std::str::FromStr;

use hl_core::{ThreadItem, Viewer};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::state::ChatState;

/// Single-select filter over the thread list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreadFilter {
    #[default]
    All,
    /// Claimed by an agent and not closed.
    Open,
    /// Waiting for an agent and not closed.
    Pending,
    Closed,
}

impl ThreadFilter {
    /// Selecting the active filter again resets to [`ThreadFilter::All`].
    pub fn toggle(self, requested: ThreadFilter) -> ThreadFilter {
        if self == requested {
            ThreadFilter::All
        } else {
            requested
        }
    }

    pub fn matches(self, thread: &ThreadItem) -> bool {
        match self {
            ThreadFilter::All => true,
            ThreadFilter::Open => !thread.is_closed() && thread.is_assigned(),
            ThreadFilter::Pending => !thread.is_closed() && !thread.is_assigned(),
            ThreadFilter::Closed => thread.is_closed(),
        }
    }

    /// Threads passing the filter, in list order.
    pub fn apply(self, threads: &[ThreadItem]) -> Vec<&ThreadItem> {
        threads.iter().filter(|t| self.matches(t)).collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadFilter::All => "all",
            ThreadFilter::Open => "open",
            ThreadFilter::Pending => "pending",
            ThreadFilter::Closed => "closed",
        }
    }
}

impl fmt::Display for ThreadFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ThreadFilter {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(ThreadFilter::All),
            "open" => Ok(ThreadFilter::Open),
            "pending" => Ok(ThreadFilter::Pending),
            "closed" => Ok(ThreadFilter::Closed),
            _ => Err(ClientError::InvalidInput(format!("unknown filter: {}", s))),
        }
    }
}

/// Badge counts shown next to the filter buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCounts {
    pub open: usize,
    pub pending: usize,
    pub closed: usize,
}

impl FilterCounts {
    pub fn of(threads: &[ThreadItem]) -> Self {
        threads.iter().fold(FilterCounts::default(), |mut counts, t| {
            if ThreadFilter::Closed.matches(t) {
                counts.closed += 1;
            } else if t.is_assigned() {
                counts.open += 1;
            } else {
                counts.pending += 1;
            }
            counts
        })
    }
}

/// Whether `viewer` may post into `thread`. No viewer means no sending.
pub fn can_send_into(viewer: Option<&Viewer>, thread: &ThreadItem) -> bool {
    viewer.is_some_and(|v| v.can_send_into(thread))
}

/// First thread of the filtered list, the default selection after login.
pub fn first_visible(threads: &[ThreadItem], filter: ThreadFilter) -> Option<&ThreadItem> {
    threads.iter().find(|t| filter.matches(t))
}

/// Drops the selection when it is no longer in the filtered list.
///
/// Returns `true` if the selection was cleared.
pub fn sync_selection(state: &mut ChatState) -> bool {
    let Some(selected) = state.selected_id() else {
        return false;
    };
    let filter = state.filter;
    let still_listed = state
        .threads
        .iter()
        .any(|t| t.id == selected && filter.matches(t));
    if still_listed {
        return false;
    }
    state.clear_selection();
    true
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
