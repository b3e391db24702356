// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Merges authoritative thread records into the local thread list.
//!
//! Pushed updates are the only source of truth after the initial listing.
//! Replace-by-id keeps reconciliation idempotent under duplicate or
//! reordered pushes, and the selection is never left pointing at a thread
//! the viewer can no longer act on.

use std::collections::HashSet;

use hl_core::{ThreadItem, Viewer};
use tracing::debug;

use crate::state::ChatState;
use crate::view::sync_selection;

/// What applying one update did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The viewer may not see the thread; it was removed.
    Hidden { was_selected: bool },
    /// The thread was merged into the list.
    Merged {
        inserted: bool,
        /// The selected thread is now closed.
        selection_closed: bool,
        /// The selection fell out of the active filter and was cleared.
        selection_dropped: bool,
    },
}

impl Reconciled {
    /// The selection was cleared, so per-thread subscriptions and local
    /// typing must stop.
    pub fn selection_dropped(&self) -> bool {
        match *self {
            Reconciled::Hidden { was_selected } => was_selected,
            Reconciled::Merged {
                selection_dropped, ..
            } => selection_dropped,
        }
    }

    /// Local typing must stop.
    pub fn stops_typing(&self) -> bool {
        match *self {
            Reconciled::Hidden { was_selected } => was_selected,
            Reconciled::Merged {
                selection_closed,
                selection_dropped,
                ..
            } => selection_closed || selection_dropped,
        }
    }
}

/// Applies one thread record for `viewer`.
pub fn apply_update(state: &mut ChatState, viewer: &Viewer, update: ThreadItem) -> Reconciled {
    let was_selected = state.selected_id() == Some(update.id.as_str());

    if !viewer.can_see(&update) {
        let before = state.threads.len();
        state.threads.retain(|t| t.id != update.id);
        if was_selected {
            state.clear_selection();
        }
        debug!(
            thread = %update.id,
            removed = before != state.threads.len(),
            "thread no longer visible"
        );
        return Reconciled::Hidden { was_selected };
    }

    let inserted = match state.threads.iter_mut().find(|t| t.id == update.id) {
        Some(existing) => {
            *existing = update.clone();
            false
        }
        None => {
            state.threads.insert(0, update.clone());
            true
        }
    };

    let mut selection_closed = false;
    if was_selected {
        if update.is_closed() {
            selection_closed = true;
            state.typers.clear();
        }
        state.selected = Some(update);
    }

    let selection_dropped = sync_selection(state);
    Reconciled::Merged {
        inserted,
        selection_closed,
        selection_dropped,
    }
}

/// Replaces the thread list with a fresh listing.
///
/// Duplicate ids keep their first occurrence; threads the viewer may not
/// see are left out. Returns `true` if the selection was cleared.
pub fn seed(state: &mut ChatState, viewer: &Viewer, threads: Vec<ThreadItem>) -> bool {
    let mut seen = HashSet::new();
    state.threads = threads
        .into_iter()
        .filter(|t| viewer.can_see(t) && seen.insert(t.id.clone()))
        .collect();

    let fresh = state
        .selected_id()
        .and_then(|id| state.thread(id))
        .cloned();
    if let Some(fresh) = fresh {
        if fresh.is_closed() {
            state.typers.clear();
        }
        state.selected = Some(fresh);
    }
    sync_selection(state)
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
