//! Bounded log of previous runs, most recent first.

use crate::trace::Trace;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of runs kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// One recorded run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub input: String,
    pub accepted: bool,
}

/// Most-recent-first run log; the oldest entry is evicted when full.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    /// A capacity of 0 is treated as 1.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record the outcome of `trace`. Traces without steps are ignored.
    pub fn record(&mut self, trace: &Trace) -> Option<&HistoryEntry> {
        if trace.is_empty() {
            return None;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(HistoryEntry {
            input: trace.input().to_string(),
            accepted: trace.is_accepted(),
        });
        self.entries.front()
    }

    /// Entry `index`, where 0 is the most recent run.
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
