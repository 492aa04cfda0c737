//! Admin approval queue: pending users browsed one at a time.
//!
//! Entries are an ordered sequence plus a cursor. Neighbours are derived from
//! the cursor (`has_next`, `has_previous`) rather than stored as links, so
//! removing an entry never leaves a dangling reference.

#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalQueue<T> {
    entries: Vec<T>,
    cursor: usize,
}

impl<T> ApprovalQueue<T> {
    /// Queue positioned on the first entry.
    #[must_use]
    pub fn new(entries: Vec<T>) -> Self {
        Self { entries, cursor: 0 }
    }

    /// The entry under the cursor, or `None` when the queue is empty.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.cursor)
    }

    /// Cursor position, or `None` when the queue is empty.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        (self.cursor < self.entries.len()).then_some(self.cursor)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.cursor > 0 && !self.entries.is_empty()
    }

    /// Advance to the next entry. Stays put at the end.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&T> {
        if self.has_next() {
            self.cursor += 1;
        }
        self.current()
    }

    /// Step back to the previous entry. Stays put at the start.
    pub fn previous(&mut self) -> Option<&T> {
        if self.has_previous() {
            self.cursor -= 1;
        }
        self.current()
    }

    /// Jump to the first entry matching `pred`.
    pub fn select_where(&mut self, pred: impl Fn(&T) -> bool) -> Option<&T> {
        let index = self.entries.iter().position(pred)?;
        self.cursor = index;
        self.current()
    }

    /// Remove the current entry after it was approved or rejected.
    ///
    /// The cursor moves to the previous entry, or to the new first entry when
    /// the removed one was first.
    pub fn remove_current(&mut self) -> Option<T> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(self.cursor);
        self.cursor = self.cursor.saturating_sub(1);
        Some(removed)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "approval_test.rs"]
mod tests;
