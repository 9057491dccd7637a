// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded undo/redo over block array snapshots.
//!
//! [`History`] is a small past/present/future machine. Committing a new
//! snapshot pushes the old present onto the past (evicting the oldest entry
//! beyond the step limit) and clears the redo branch; undo and redo shuttle
//! snapshots between the three slots and are no-ops at the ends.
//!
//! Snapshots are whole block arrays, not diffs. The engine's copy-on-write
//! indices make these cheap to take, and whole-state restore sidesteps the
//! usual inverse-operation bookkeeping.
//!
//! ```rust
//! use canopy_blocks::Block;
//! use canopy_history::History;
//!
//! let mut history = History::new(vec![], 10);
//! history.set(vec![Block::new("a", "paragraph")]);
//! assert!(history.undo());
//! assert!(history.present().is_empty());
//! assert!(history.redo());
//! assert_eq!(history.present().len(), 1);
//! ```

#![no_std]

extern crate alloc;

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use canopy_blocks::Block;

/// Past/present/future snapshots with a bounded past.
#[derive(Clone, Debug, Default)]
pub struct History {
    past: VecDeque<Vec<Block>>,
    present: Vec<Block>,
    future: Vec<Vec<Block>>,
    max_steps: usize,
}

impl History {
    /// Start from `present`, remembering at most `max_steps` undo states.
    ///
    /// `max_steps` of zero disables undo entirely.
    pub fn new(present: Vec<Block>, max_steps: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present,
            future: Vec::new(),
            max_steps,
        }
    }

    /// The current snapshot.
    pub fn present(&self) -> &[Block] {
        &self.present
    }

    /// Whether an undo step exists.
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether a redo step exists.
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Commit a new snapshot.
    ///
    /// The old present becomes the newest past entry (evicting the oldest
    /// when the limit is hit) and any redo branch is discarded.
    pub fn set(&mut self, blocks: Vec<Block>) {
        if self.max_steps > 0 {
            if self.past.len() == self.max_steps {
                self.past.pop_front();
            }
            self.past.push_back(core::mem::replace(&mut self.present, blocks));
        } else {
            self.present = blocks;
        }
        self.future.clear();
    }

    /// Step back one snapshot. Returns `false` (and changes nothing) when
    /// the past is empty.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        self.future.push(core::mem::replace(&mut self.present, previous));
        true
    }

    /// Step forward one snapshot. Returns `false` (and changes nothing) when
    /// the future is empty.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        self.past.push_back(core::mem::replace(&mut self.present, next));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn snapshot(n: usize) -> Vec<Block> {
        (0..n).map(|_| Block::new("b", "paragraph")).collect()
    }

    #[test]
    fn capped_past_allows_exactly_max_steps_undos() {
        let mut history = History::new(snapshot(0), 3);
        for n in 1..=5 {
            history.set(snapshot(n));
        }
        let mut undos = 0;
        while history.undo() {
            undos += 1;
        }
        assert_eq!(undos, 3, "the past is capped at max_steps");
        // The oldest surviving snapshot is the one from two evictions in.
        assert_eq!(history.present().len(), 2);
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut history = History::new(snapshot(0), 10);
        history.set(snapshot(1));
        history.set(snapshot(2));
        assert!(history.undo());
        assert_eq!(history.present().len(), 1);
        assert!(history.redo());
        assert_eq!(history.present().len(), 2);
        assert!(!history.redo(), "future exhausted");
    }

    #[test]
    fn set_clears_the_redo_branch() {
        let mut history = History::new(snapshot(0), 10);
        history.set(snapshot(1));
        assert!(history.undo());
        assert!(history.can_redo());
        history.set(snapshot(7));
        assert!(!history.can_redo());
        assert_eq!(history.present().len(), 7);
    }

    #[test]
    fn undo_at_the_start_is_a_no_op() {
        let mut history = History::new(snapshot(4), 10);
        assert!(!history.can_undo());
        assert!(!history.undo());
        assert_eq!(history.present().len(), 4);
    }

    #[test]
    fn zero_steps_disables_undo() {
        let mut history = History::new(snapshot(0), 0);
        history.set(snapshot(1));
        history.set(snapshot(2));
        assert!(!history.can_undo());
        assert_eq!(history.present().len(), 2);
    }
}
