// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Drag sessions for reordering lines.
//!
//! A session follows the pointer (or arrow keys) across a frozen list of
//! line ids. Nothing is reordered until the drop, which yields a single
//! [`DragCommit`] for the editor to apply.

use super::LineId;

/// Result of a finished drag: move `active` to where `over` is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragCommit {
    pub active: LineId,
    pub over: LineId,
}

/// An in-progress drag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    ids: Vec<LineId>,
    active: LineId,
    over: usize,
}

impl DragSession {
    /// Pick up `active` from the ordered `ids`; `None` if it is not there
    pub fn begin(ids: Vec<LineId>, active: LineId) -> Option<Self> {
        let over = ids.iter().position(|&id| id == active)?;
        Some(Self { ids, active, over })
    }

    /// The line being dragged
    pub fn active(&self) -> LineId {
        self.active
    }

    /// The line currently under the dragged one
    pub fn over(&self) -> LineId {
        self.ids[self.over]
    }

    /// Index the dragged line would land on
    pub fn over_index(&self) -> usize {
        self.over
    }

    /// Pointer moved onto a line. Unknown ids leave the target as is.
    pub fn hover(&mut self, id: LineId) {
        if let Some(index) = self.ids.iter().position(|&i| i == id) {
            self.over = index;
        }
    }

    /// Pointer moved onto a row index; clamped to the list
    pub fn hover_index(&mut self, index: usize) {
        self.over = index.min(self.ids.len() - 1);
    }

    /// Keyboard sensor: one row up
    pub fn step_up(&mut self) {
        self.over = self.over.saturating_sub(1);
    }

    /// Keyboard sensor: one row down
    pub fn step_down(&mut self) {
        if self.over + 1 < self.ids.len() {
            self.over += 1;
        }
    }

    /// Abandon the drag, handing back the line that was picked up
    pub fn cancel(self) -> LineId {
        self.active
    }

    /// Finish the drag. Dropping a line onto itself commits nothing.
    pub fn drop_commit(self) -> Option<DragCommit> {
        let over = self.over();
        if over == self.active {
            None
        } else {
            Some(DragCommit {
                active: self.active,
                over,
            })
        }
    }
}
