//! Linear undo/redo over whole-canvas snapshots.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use crate::consts::HISTORY_LIMIT;
use crate::doc::CanvasData;

/// Ordered snapshots plus a cursor into them.
///
/// The cursor always points at a valid snapshot: construction requires an
/// initial one and nothing removes the snapshot under the cursor.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<CanvasData>,
    index: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(CanvasData::default())
    }
}

impl History {
    /// Start a history with one snapshot and the default capacity.
    #[must_use]
    pub fn new(initial: CanvasData) -> Self {
        Self::with_limit(initial, HISTORY_LIMIT)
    }

    /// Start a history that keeps at most `limit` snapshots (minimum 1).
    #[must_use]
    pub fn with_limit(initial: CanvasData, limit: usize) -> Self {
        Self { snapshots: vec![initial], index: 0, limit: limit.max(1) }
    }

    /// Record a new snapshot after the cursor.
    ///
    /// Anything after the cursor is discarded first. When the capacity is
    /// exceeded the oldest snapshots are dropped.
    pub fn push(&mut self, snapshot: CanvasData) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(snapshot);
        let overflow = self.snapshots.len().saturating_sub(self.limit);
        if overflow > 0 {
            self.snapshots.drain(..overflow);
        }
        self.index = self.snapshots.len() - 1;
    }

    /// Step back one snapshot. `None` at the oldest snapshot.
    pub fn undo(&mut self) -> Option<&CanvasData> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.snapshots.get(self.index)
    }

    /// Step forward one snapshot. `None` at the tip.
    pub fn redo(&mut self) -> Option<&CanvasData> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.snapshots.get(self.index)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// The snapshot under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&CanvasData> {
        self.snapshots.get(self.index)
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Drop every snapshot and start over from `initial`.
    pub fn reset(&mut self, initial: CanvasData) {
        self.snapshots.clear();
        self.snapshots.push(initial);
        self.index = 0;
    }
}
