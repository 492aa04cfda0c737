//! Bounded linear undo/redo over full layer snapshots.
//!
//! DESIGN
//! ======
//! The stack holds whole [`Snapshot`]s plus a cursor (`step`) at the one
//! currently displayed. Discrete edits (insert, delete, clear) commit straight
//! away. Continuous gestures (drag, resize) only mark the history dirty; the
//! editor commits once at the gesture boundary, so a drag of a hundred pointer
//! moves becomes one undo step.
//!
//! Invariants:
//! - `0 <= step < len <= capacity`
//! - committing while `step < len - 1` drops every snapshot after `step`
//! - committing past capacity evicts from the front

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use crate::consts::HISTORY_CAPACITY;
use crate::layers::{Layer, LayerStack, Snapshot};

/// Undo/redo stack with dirty tracking.
#[derive(Debug, Clone)]
pub struct History {
    stack: VecDeque<Snapshot>,
    step: usize,
    dirty: bool,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl History {
    /// Start a history whose only entry is `initial`.
    #[must_use]
    pub fn new(initial: Snapshot) -> Self {
        Self::with_capacity(initial, HISTORY_CAPACITY)
    }

    /// Like [`History::new`] with a custom bound. A capacity of zero is treated as one.
    #[must_use]
    pub fn with_capacity(initial: Snapshot, capacity: usize) -> Self {
        let mut stack = VecDeque::with_capacity(capacity.max(1));
        stack.push_back(initial);
        Self { stack, step: 0, dirty: false, capacity: capacity.max(1) }
    }

    /// Discard everything and restart from `snapshot` at step 0.
    pub fn reset(&mut self, snapshot: Snapshot) {
        self.stack.clear();
        self.stack.push_back(snapshot);
        self.step = 0;
        self.dirty = false;
    }

    /// Push a new snapshot after the cursor, dropping any redo branch.
    pub fn commit(&mut self, snapshot: Snapshot) {
        self.stack.truncate(self.step + 1);
        self.stack.push_back(snapshot);
        while self.stack.len() > self.capacity {
            self.stack.pop_front();
        }
        self.step = self.stack.len() - 1;
        self.dirty = false;
    }

    /// Commit the live layers only if a gesture left them dirty. Returns whether it did.
    pub fn commit_if_dirty(&mut self, live: &LayerStack) -> bool {
        if !self.dirty {
            return false;
        }
        self.commit(live.snapshot());
        true
    }

    /// Record that the live layers diverged from the snapshot at `step`.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether uncommitted edits exist.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Step back one snapshot. Returns the snapshot to display, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&[Layer]> {
        if self.step == 0 {
            return None;
        }
        self.step -= 1;
        self.dirty = false;
        self.stack.get(self.step).map(Vec::as_slice)
    }

    /// Step forward one snapshot. Returns the snapshot to display, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&[Layer]> {
        if self.step + 1 >= self.stack.len() {
            return None;
        }
        self.step += 1;
        self.dirty = false;
        self.stack.get(self.step).map(Vec::as_slice)
    }

    /// Whether [`History::undo`] would move.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.step > 0
    }

    /// Whether [`History::redo`] would move.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.step + 1 < self.stack.len()
    }

    /// Cursor position.
    #[must_use]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Number of retained snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Always false; a history holds at least one snapshot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Maximum number of retained snapshots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The snapshot at the cursor.
    #[must_use]
    pub fn current(&self) -> &[Layer] {
        self.stack.get(self.step).map_or(&[], Vec::as_slice)
    }

    /// The snapshot at an arbitrary position, oldest first.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&[Layer]> {
        self.stack.get(index).map(Vec::as_slice)
    }
}
