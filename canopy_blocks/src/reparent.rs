// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reparenting: moving blocks to a drop zone.
//!
//! Both entry points recompute a whole candidate index from `&self` and leave
//! `self` untouched. Invalid moves are not errors: they return `None`, the
//! cheap "nothing changed" signal, so a caller driving a live drag can keep
//! its current candidate without comparing trees structurally. Rejections
//! are:
//!
//! - the dragged id does not exist,
//! - the zone targets the dragged block itself or one of its descendants
//!   (the move would make the block its own ancestor),
//! - the zone nests into a block whose kind is not a container,
//! - the move would exceed the configured maximum nesting depth,
//! - the move lands exactly where the block already is.

use alloc::vec::Vec;
use canopy_order::{OrderKey, OrderStrategy, key_between, n_keys_between};
use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::index::BlockIndex;
use crate::types::{BlockId, ContainerKinds};
use crate::zone::DropZone;

/// Insertion position for `zone` within a destination sibling list that no
/// longer contains the moved ids. `None` when the zone's target block is not
/// in the list (inconsistent input).
pub(crate) fn insertion_index(list: &[BlockId], zone: &DropZone) -> Option<usize> {
    match zone {
        DropZone::Before(t) => list.iter().position(|id| id == t),
        DropZone::After(t) => list.iter().position(|id| id == t).map(|i| i + 1),
        DropZone::Into(_) | DropZone::RootStart => Some(0),
        DropZone::End(_) | DropZone::RootEnd => Some(list.len()),
    }
}

impl BlockIndex {
    /// Resolve the parent a zone places blocks under, honoring the container
    /// gate. `Err(())` distinguishes "invalid" from "root level".
    fn zone_parent(
        &self,
        zone: &DropZone,
        kinds: &ContainerKinds,
    ) -> Result<Option<BlockId>, ()> {
        match zone {
            DropZone::Before(t) | DropZone::After(t) => {
                let target = self.get(t).ok_or(())?;
                Ok(target.parent.clone())
            }
            DropZone::Into(t) | DropZone::End(t) => {
                let target = self.get(t).ok_or(())?;
                if !kinds.allows_children(&target.kind) {
                    return Err(());
                }
                Ok(Some(t.clone()))
            }
            DropZone::RootStart | DropZone::RootEnd => Ok(None),
        }
    }

    /// Move a single block to a drop zone, yielding the candidate index.
    ///
    /// Returns `None` for every rejected or positionless move (see the
    /// module docs); otherwise the moved block's `parent` is updated and,
    /// under the fractional strategy, its `order` key is regenerated to sit
    /// between its new neighbors. Under the integer strategy stale `order`
    /// fields are left for the next [`ordered_blocks`](Self::ordered_blocks)
    /// walk to rewrite.
    ///
    /// ```rust
    /// use canopy_blocks::{Block, BlockIndex, ContainerKinds, DropZone};
    /// use canopy_order::OrderStrategy;
    ///
    /// let index = BlockIndex::from_blocks(&[
    ///     Block::new("a", "paragraph"),
    ///     Block::new("b", "paragraph"),
    /// ]);
    /// let kinds = ContainerKinds::none();
    /// let zone = DropZone::parse("before-a").unwrap();
    /// let moved = index
    ///     .reparent(&"b".into(), &zone, &kinds, OrderStrategy::Reindex, None)
    ///     .unwrap();
    /// assert_eq!(moved.roots()[0].as_str(), "b");
    ///
    /// // Dropping a block onto itself is a no-op, signalled as `None`.
    /// let self_zone = DropZone::parse("after-b").unwrap();
    /// assert!(index.reparent(&"b".into(), &self_zone, &kinds, OrderStrategy::Reindex, None).is_none());
    /// ```
    pub fn reparent(
        &self,
        active: &BlockId,
        zone: &DropZone,
        kinds: &ContainerKinds,
        strategy: OrderStrategy,
        max_depth: Option<usize>,
    ) -> Option<Self> {
        let block = self.get(active)?;
        if zone.target() == Some(active) {
            return None;
        }
        let new_parent = self.zone_parent(zone, kinds).ok()?;

        // Cycle guard: the destination parent must not live inside the
        // dragged subtree. `descendants` includes `active` itself.
        if let Some(p) = &new_parent {
            let subtree = self.descendants(active);
            if subtree.contains(p) {
                return None;
            }
        }

        if let Some(limit) = max_depth {
            let parent_depth = new_parent.as_ref().map_or(0, |p| self.block_depth(p));
            if parent_depth + self.subtree_depth(active) > limit {
                return None;
            }
        }

        let old_parent = block.parent.clone();
        let mut by_id = self.by_id.clone();
        let mut by_parent = self.by_parent.clone();

        let mut old_index = None;
        if let Some(list) = by_parent.get_mut(&old_parent)
            && let Some(at) = list.iter().position(|id| id == active)
        {
            list.remove(at);
            old_index = Some(at);
        }

        let at = {
            let dest = by_parent.entry(new_parent.clone()).or_default();
            let at = insertion_index(dest, zone)?;
            if new_parent == old_parent && Some(at) == old_index {
                // Landed exactly where it started.
                return None;
            }
            dest.insert(at, active.clone());
            at
        };

        let moved = by_id.get_mut(active).expect("active block was looked up");
        moved.parent = new_parent.clone();
        if strategy == OrderStrategy::Fractional {
            let dest = &by_parent[&new_parent];
            let low = at
                .checked_sub(1)
                .and_then(|i| self.fractional_order(&dest[i]));
            let high = dest.get(at + 1).and_then(|id| self.fractional_order(id));
            moved.order = OrderKey::Fractional(key_between(low, high));
        }

        Some(Self { by_id, by_parent })
    }

    /// Move several blocks to a drop zone as one contiguous run.
    ///
    /// The run keeps the blocks' original relative order in the document (a
    /// depth-first walk of `self`), not the order the caller listed them in,
    /// so a multi-select drag looks stable. Ids that are descendants of other
    /// dragged ids travel with their ancestor and are dropped from the run;
    /// unknown ids are ignored. Validation matches [`reparent`](Self::reparent),
    /// applied against the whole run (the depth check uses the tallest
    /// dragged subtree).
    pub fn reparent_many(
        &self,
        active: &[BlockId],
        zone: &DropZone,
        kinds: &ContainerKinds,
        strategy: OrderStrategy,
        max_depth: Option<usize>,
    ) -> Option<Self> {
        let run = self.independent_roots(active);
        let [single] = run.as_slice() else {
            return self.reparent_run(&run, zone, kinds, strategy, max_depth);
        };
        self.reparent(single, zone, kinds, strategy, max_depth)
    }

    /// Drop unknown ids and ids covered by a dragged ancestor, and sort the
    /// survivors into document order.
    fn independent_roots(&self, active: &[BlockId]) -> SmallVec<[BlockId; 4]> {
        let selected: HashSet<&BlockId> = active.iter().filter(|id| self.contains(id)).collect();
        let mut roots: HashSet<&BlockId> = HashSet::new();
        'candidate: for &id in &selected {
            let mut parent = self.get(id).and_then(|b| b.parent.as_ref());
            let mut steps = self.len();
            while let Some(p) = parent {
                if selected.contains(p) {
                    continue 'candidate;
                }
                if steps == 0 {
                    break;
                }
                steps -= 1;
                parent = self.get(p).and_then(|b| b.parent.as_ref());
            }
            roots.insert(id);
        }

        // Document order: the depth-first walk order of the source tree.
        let mut run = SmallVec::new();
        let mut stack: Vec<&BlockId> = self.roots().iter().rev().collect();
        while let Some(id) = stack.pop() {
            if roots.contains(id) {
                run.push(id.clone());
            }
            stack.extend(self.children(Some(id)).iter().rev());
        }
        run
    }

    fn reparent_run(
        &self,
        run: &[BlockId],
        zone: &DropZone,
        kinds: &ContainerKinds,
        strategy: OrderStrategy,
        max_depth: Option<usize>,
    ) -> Option<Self> {
        if run.is_empty() {
            return None;
        }

        let mut dragged: HashSet<BlockId> = HashSet::new();
        let mut tallest = 0;
        for id in run {
            tallest = tallest.max(self.subtree_depth(id));
            dragged.extend(self.descendants(id));
        }
        if let Some(t) = zone.target()
            && dragged.contains(t)
        {
            return None;
        }
        let new_parent = self.zone_parent(zone, kinds).ok()?;
        if let Some(p) = &new_parent
            && dragged.contains(p)
        {
            return None;
        }
        if let Some(limit) = max_depth {
            let parent_depth = new_parent.as_ref().map_or(0, |p| self.block_depth(p));
            if parent_depth + tallest > limit {
                return None;
            }
        }

        let mut by_id = self.by_id.clone();
        let mut by_parent = self.by_parent.clone();
        for id in run {
            let old_parent = self.get(id).and_then(|b| b.parent.clone());
            if let Some(list) = by_parent.get_mut(&old_parent) {
                list.retain(|sibling| sibling != id);
            }
        }

        let at = {
            let dest = by_parent.entry(new_parent.clone()).or_default();
            let at = insertion_index(dest, zone)?;
            for (offset, id) in run.iter().enumerate() {
                dest.insert(at + offset, id.clone());
            }
            at
        };

        // A run that reassembles the source lists exactly is a no-op.
        if by_parent == self.by_parent {
            return None;
        }

        let keys = if strategy == OrderStrategy::Fractional {
            let dest = &by_parent[&new_parent];
            let low = at
                .checked_sub(1)
                .and_then(|i| self.fractional_order(&dest[i]));
            let high = dest
                .get(at + run.len())
                .and_then(|id| self.fractional_order(id));
            Some(n_keys_between(low, high, run.len()))
        } else {
            None
        };
        for (offset, id) in run.iter().enumerate() {
            let moved = by_id.get_mut(id).expect("run ids exist in the index");
            moved.parent = new_parent.clone();
            if let Some(keys) = &keys {
                moved.order = OrderKey::Fractional(keys[offset].clone());
            }
        }

        Some(Self { by_id, by_parent })
    }
}
