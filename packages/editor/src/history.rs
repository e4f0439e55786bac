//! # Snapshot History
//!
//! Linear undo/redo over serialized body snapshots.
//!
//! ## Design
//!
//! - Entries are full body markup strings, oldest first
//! - The cursor indexes the entry currently reflected in the surface
//! - Pushing truncates everything after the cursor (redo is lost)
//! - Undo/redo only move the cursor; the caller applies the entry
//! - Oldest entries are trimmed when the level limit is exceeded
//!
//! ## Example
//!
//! ```rust
//! use pagecraft_editor::History;
//!
//! let mut history = History::new();
//! history.push("<p>a</p>");
//! history.push("<p>b</p>");
//!
//! assert_eq!(history.undo(), Some("<p>a</p>"));
//! assert_eq!(history.redo(), Some("<p>b</p>"));
//! assert_eq!(history.redo(), None);
//! ```

/// Undo/redo history of body snapshots
#[derive(Debug, Clone)]
pub struct History {
    /// Snapshots, oldest first
    entries: Vec<String>,

    /// Index of the current entry (meaningless while empty)
    cursor: usize,

    /// Maximum number of entries (0 = unlimited)
    max_levels: usize,
}

impl History {
    /// Create a history with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            max_levels,
        }
    }

    /// Record a snapshot as the new current entry
    pub fn push(&mut self, snapshot: impl Into<String>) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot.into());
        self.cursor = self.entries.len() - 1;

        if self.max_levels > 0 && self.entries.len() > self.max_levels {
            let excess = self.entries.len() - self.max_levels;
            self.entries.drain(..excess);
            self.cursor -= excess;
        }
    }

    /// Drop everything and start over from a single baseline entry
    pub fn reset(&mut self, baseline: impl Into<String>) {
        self.entries.clear();
        self.cursor = 0;
        self.push(baseline);
    }

    /// Entry an undo would move to, without moving
    pub fn peek_undo(&self) -> Option<&str> {
        if self.can_undo() {
            Some(&self.entries[self.cursor - 1])
        } else {
            None
        }
    }

    /// Entry a redo would move to, without moving
    pub fn peek_redo(&self) -> Option<&str> {
        if self.can_redo() {
            Some(&self.entries[self.cursor + 1])
        } else {
            None
        }
    }

    /// Step back one entry. `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor])
    }

    /// Step forward one entry. `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&str> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor])
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn current(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(String::as_str)
    }

    /// Index of the current entry, `None` while empty
    pub fn cursor(&self) -> Option<usize> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.cursor)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
