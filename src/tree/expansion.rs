//! Which rows are expanded, and which are waiting on a children fetch.

use std::collections::HashSet;

use crate::types::AccountId;

/// Display state of a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Collapsed,
    /// Children fetch in flight. The row was expanded when the fetch started
    /// but may have been collapsed since; `is_expanded` tells which.
    Loading,
    Expanded,
}

#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    expanded: HashSet<AccountId>,
    in_flight: HashSet<AccountId>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: &AccountId) -> bool {
        self.expanded.contains(id)
    }

    pub fn is_loading(&self, id: &AccountId) -> bool {
        self.in_flight.contains(id)
    }

    pub fn state(&self, id: &AccountId) -> NodeState {
        if self.in_flight.contains(id) {
            NodeState::Loading
        } else if self.expanded.contains(id) {
            NodeState::Expanded
        } else {
            NodeState::Collapsed
        }
    }

    /// Returns true if the row was not already expanded.
    pub fn expand(&mut self, id: &AccountId) -> bool {
        self.expanded.insert(id.clone())
    }

    /// Hide the row's children. An in-flight fetch keeps its marker so a
    /// second expand cannot start a duplicate request.
    pub fn collapse(&mut self, id: &AccountId) -> bool {
        self.expanded.remove(id)
    }

    /// Forget everything. Used whenever the forest is rebuilt.
    pub fn clear(&mut self) {
        self.expanded.clear();
        self.in_flight.clear();
    }

    /// Mark a fetch as started and optimistically expand the row.
    /// Returns false if a fetch for this id is already running.
    pub fn begin_loading(&mut self, id: &AccountId) -> bool {
        if !self.in_flight.insert(id.clone()) {
            return false;
        }
        self.expanded.insert(id.clone());
        true
    }

    /// Settle a fetch. On failure the row goes back to collapsed.
    /// Returns false if no fetch was pending (e.g. cleared by a rebuild).
    pub fn finish_loading(&mut self, id: &AccountId, succeeded: bool) -> bool {
        let was_pending = self.in_flight.remove(id);
        if !succeeded {
            self.expanded.remove(id);
        }
        was_pending
    }
}
