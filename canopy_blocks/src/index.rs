// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Normalized block storage: the [`BlockIndex`].

use alloc::vec::Vec;
use canopy_order::{OrderKey, OrderStrategy, key_between};
use hashbrown::{HashMap, HashSet};

use crate::types::{Block, BlockId, TreeIssue};
use crate::zone::DropZone;

/// Normalized storage of one logical tree state.
///
/// Blocks are held twice: by id, and as ordered sibling lists keyed by parent
/// (`None` is the sole root key). The sibling lists are the authoritative
/// order for tree walks; under the integer strategy a block's own `order`
/// field is derived from its list position, while under the fractional
/// strategy the `order` key is independently authoritative.
///
/// An index is never mutated after construction. Every mutator takes `&self`
/// and produces a **new** index by cloning the two maps, so a caller can hold
/// a snapshot of a prior state safely. This is what lets a drag operation
/// recompute candidate states from its start-of-drag snapshot instead of
/// accumulating drift across pointer moves.
///
/// ## Example
///
/// ```rust
/// use canopy_blocks::{Block, BlockIndex};
/// use canopy_order::OrderStrategy;
///
/// let index = BlockIndex::from_blocks(&[
///     Block::new("a", "paragraph"),
///     Block::new("b", "paragraph"),
/// ]);
/// let walk = index.ordered_blocks(OrderStrategy::Reindex);
/// assert_eq!(walk.len(), 2);
/// assert_eq!(walk[1].order.index(), Some(1));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockIndex {
    pub(crate) by_id: HashMap<BlockId, Block>,
    pub(crate) by_parent: HashMap<Option<BlockId>, Vec<BlockId>>,
}

impl BlockIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a flat block array in one pass.
    ///
    /// Sibling lists follow input order. No invariants are checked here; call
    /// [`validate`](Self::validate) separately when the input is untrusted.
    pub fn from_blocks(blocks: &[Block]) -> Self {
        let mut by_id = HashMap::with_capacity(blocks.len());
        let mut by_parent: HashMap<Option<BlockId>, Vec<BlockId>> = HashMap::new();
        for block in blocks {
            by_parent
                .entry(block.parent.clone())
                .or_default()
                .push(block.id.clone());
            by_id.insert(block.id.clone(), block.clone());
        }
        Self { by_id, by_parent }
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the index holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Look up a block by id.
    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.by_id.get(id)
    }

    /// Whether a block with this id exists.
    pub fn contains(&self, id: &BlockId) -> bool {
        self.by_id.contains_key(id)
    }

    /// The ordered children of `parent` (`None` for the root level).
    pub fn children(&self, parent: Option<&BlockId>) -> &[BlockId] {
        match parent {
            Some(p) => self
                .by_parent
                .get(&Some(p.clone()))
                .map_or(&[], Vec::as_slice),
            None => self.by_parent.get(&None).map_or(&[], Vec::as_slice),
        }
    }

    /// The ordered root-level block ids.
    pub fn roots(&self) -> &[BlockId] {
        self.children(None)
    }

    /// Flatten the index into a depth-first block array.
    ///
    /// For [`OrderStrategy::Reindex`] each emitted block's `order` is
    /// rewritten to its 0-based sibling position during the walk, so the
    /// output is consistent even when stale `order` fields disagree with the
    /// sibling lists. For [`OrderStrategy::Fractional`] the stored keys are
    /// authoritative and left untouched.
    pub fn ordered_blocks(&self, strategy: OrderStrategy) -> Vec<Block> {
        let mut out = Vec::with_capacity(self.by_id.len());
        // (id, sibling position); children are pushed in reverse so the walk
        // emits them in list order.
        let mut stack: Vec<(&BlockId, usize)> = Vec::new();
        for (pos, id) in self.roots().iter().enumerate().rev() {
            stack.push((id, pos));
        }
        while let Some((id, pos)) = stack.pop() {
            let Some(block) = self.by_id.get(id) else {
                continue;
            };
            let mut block = block.clone();
            if strategy == OrderStrategy::Reindex {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "Sibling positions are far below i64::MAX."
                )]
                let pos = pos as i64;
                block.order = OrderKey::Index(pos);
            }
            out.push(block);
            for (child_pos, child) in self.children(Some(id)).iter().enumerate().rev() {
                stack.push((child, child_pos));
            }
        }
        out
    }

    /// The id itself plus all transitive children, in depth-first order.
    ///
    /// Traversal is iterative (explicit stack) so pathological trees cannot
    /// exhaust the call stack, and a visited set keeps malformed cyclic input
    /// from looping forever. Unknown ids yield an empty set.
    pub fn descendants(&self, id: &BlockId) -> Vec<BlockId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut visited: HashSet<&BlockId> = HashSet::new();
        let mut stack: Vec<&BlockId> = Vec::new();
        stack.push(id);
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            out.push(current.clone());
            for child in self.children(Some(current)).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Remove a block and its whole subtree, yielding a new index.
    ///
    /// The descendant set is dropped from both maps and scrubbed from its
    /// sibling list. Removing an unknown id returns an unchanged clone.
    pub fn remove_subtree(&self, id: &BlockId) -> Self {
        let removed = self.descendants(id);
        if removed.is_empty() {
            return self.clone();
        }
        let mut by_id = self.by_id.clone();
        let mut by_parent = self.by_parent.clone();
        let old_parent = self.by_id.get(id).and_then(|b| b.parent.clone());
        if let Some(list) = by_parent.get_mut(&old_parent) {
            list.retain(|sibling| sibling != id);
        }
        for gone in &removed {
            by_id.remove(gone);
            by_parent.remove(&Some(gone.clone()));
        }
        Self { by_id, by_parent }
    }

    /// Insert a new block at a drop zone, yielding a new index.
    ///
    /// This is a caller-driven API, not a gesture: referencing a zone whose
    /// target block does not exist, or a container zone (`into-`/`end-`) on a
    /// block id the caller knows to be a leaf, is a contract violation.
    ///
    /// # Panics
    ///
    /// Panics if the zone names a block id that is not in the index.
    pub fn insert(&self, block: Block, zone: &DropZone, strategy: OrderStrategy) -> Self {
        let new_parent = match zone {
            DropZone::Before(t) | DropZone::After(t) => self
                .by_id
                .get(t)
                .expect("dangling block id in drop zone")
                .parent
                .clone(),
            DropZone::Into(t) | DropZone::End(t) => {
                assert!(self.contains(t), "dangling block id in drop zone");
                Some(t.clone())
            }
            DropZone::RootStart | DropZone::RootEnd => None,
        };

        let mut by_id = self.by_id.clone();
        let mut by_parent = self.by_parent.clone();
        let list = by_parent.entry(new_parent.clone()).or_default();
        let at = crate::reparent::insertion_index(list, zone)
            .expect("drop zone target is in its parent's sibling list");
        list.insert(at, block.id.clone());
        let (low, high) = (
            at.checked_sub(1).map(|i| list[i].clone()),
            list.get(at + 1).cloned(),
        );

        let mut block = block;
        block.parent = new_parent;
        block.order = match strategy {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Sibling positions are far below i64::MAX."
            )]
            OrderStrategy::Reindex => OrderKey::Index(at as i64),
            OrderStrategy::Fractional => {
                let low = low.as_ref().and_then(|id| self.fractional_order(id));
                let high = high.as_ref().and_then(|id| self.fractional_order(id));
                OrderKey::Fractional(key_between(low, high))
            }
        };
        by_id.insert(block.id.clone(), block);
        Self { by_id, by_parent }
    }

    /// Nesting depth of a block; roots have depth 1, unknown ids depth 0.
    pub fn block_depth(&self, id: &BlockId) -> usize {
        if !self.contains(id) {
            return 0;
        }
        let mut depth = 1;
        let mut current = self.by_id.get(id).and_then(|b| b.parent.as_ref());
        // Step bound guards against malformed cyclic parent chains.
        let mut steps = self.by_id.len();
        while let Some(parent) = current {
            if steps == 0 {
                break;
            }
            steps -= 1;
            depth += 1;
            current = self.by_id.get(parent).and_then(|b| b.parent.as_ref());
        }
        depth
    }

    /// Height of the subtree rooted at `id`; a leaf has height 1, unknown
    /// ids 0.
    pub fn subtree_depth(&self, id: &BlockId) -> usize {
        if !self.contains(id) {
            return 0;
        }
        let mut max_depth = 0;
        let mut visited: HashSet<&BlockId> = HashSet::new();
        let mut stack: Vec<(&BlockId, usize)> = Vec::new();
        stack.push((id, 1));
        while let Some((current, depth)) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            max_depth = max_depth.max(depth);
            for child in self.children(Some(current)) {
                stack.push((child, depth + 1));
            }
        }
        max_depth
    }

    /// Check the structural invariants and return every violation found.
    ///
    /// This never panics and is not called by any mutator; it exists for
    /// diagnostics on untrusted input. Mutating an index that already has a
    /// cycle is undefined (the mutators are guarded against looping, but the
    /// results are unspecified).
    pub fn validate(&self) -> Vec<TreeIssue> {
        let mut issues = Vec::new();

        // Sibling lists: dangling references and duplicates.
        let mut listed: HashSet<&BlockId> = HashSet::new();
        for (parent, list) in &self.by_parent {
            for id in list {
                if !self.by_id.contains_key(id) {
                    issues.push(TreeIssue::UnknownSibling {
                        id: id.clone(),
                        parent: parent.clone(),
                    });
                }
                if !listed.insert(id) {
                    issues.push(TreeIssue::DuplicateSibling { id: id.clone() });
                }
            }
        }

        // Blocks: orphaned parent references and ids missing from all lists.
        for (id, block) in &self.by_id {
            if let Some(parent) = &block.parent
                && !self.by_id.contains_key(parent)
            {
                issues.push(TreeIssue::OrphanParent {
                    id: id.clone(),
                    parent: parent.clone(),
                });
            }
            if !listed.contains(id) {
                issues.push(TreeIssue::Unindexed { id: id.clone() });
            }
        }

        // Cycles: depth-first over the children edges with an on-stack
        // marker. Every block is used as a start so cycles detached from the
        // root are found too.
        const WHITE: u8 = 0;
        const GREY: u8 = 1;
        const BLACK: u8 = 2;
        let mut color: HashMap<&BlockId, u8> = HashMap::with_capacity(self.by_id.len());
        for start in self.by_id.keys() {
            if color.get(start).copied().unwrap_or(WHITE) != WHITE {
                continue;
            }
            // (id, children_done) pairs; a node is grey between its two visits.
            let mut stack: Vec<(&BlockId, bool)> = Vec::new();
            stack.push((start, false));
            while let Some((id, children_done)) = stack.pop() {
                if children_done {
                    color.insert(id, BLACK);
                    continue;
                }
                match color.get(id).copied().unwrap_or(WHITE) {
                    GREY => {
                        issues.push(TreeIssue::Cycle { id: id.clone() });
                        continue;
                    }
                    BLACK => continue,
                    _ => {}
                }
                color.insert(id, GREY);
                stack.push((id, true));
                for child in self.children(Some(id)) {
                    stack.push((child, false));
                }
            }
        }

        issues
    }

    pub(crate) fn fractional_order(&self, id: &BlockId) -> Option<&canopy_order::FracKey> {
        self.by_id.get(id).and_then(|b| b.order.fractional())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_util::{frac_tree, sample_tree};
    use alloc::vec;

    #[test]
    fn from_blocks_is_input_ordered() {
        let index = sample_tree();
        let roots: Vec<&str> = index.roots().iter().map(BlockId::as_str).collect();
        assert_eq!(roots, vec!["a", "b", "c"]);
        let a = BlockId::new("a");
        let children: Vec<&str> = index
            .children(Some(&a))
            .iter()
            .map(BlockId::as_str)
            .collect();
        assert_eq!(children, vec!["a1", "a2"]);
    }

    #[test]
    fn ordered_walk_preserves_block_set_and_reindexes() {
        let index = sample_tree();
        let walk = index.ordered_blocks(OrderStrategy::Reindex);
        assert_eq!(walk.len(), index.len(), "walk must preserve the block set");
        // Depth-first: a, a1, a2, b, c.
        let ids: Vec<&str> = walk.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a1", "a2", "b", "c"]);
        // Integer orders equal sibling positions.
        for block in &walk {
            let siblings = index.children(block.parent.as_ref());
            let pos = siblings.iter().position(|id| *id == block.id).unwrap();
            assert_eq!(block.order.index(), Some(pos as i64), "order = position");
        }
    }

    #[test]
    fn ordered_walk_leaves_fractional_keys_alone() {
        let index = frac_tree();
        let walk = index.ordered_blocks(OrderStrategy::Fractional);
        for block in &walk {
            let stored = index.get(&block.id).unwrap();
            assert_eq!(block.order, stored.order, "fractional keys are authoritative");
        }
    }

    #[test]
    fn descendants_includes_self_and_transitive_children() {
        let index = sample_tree();
        let descendants = index.descendants(&BlockId::new("a"));
        let ids: Vec<&str> = descendants.iter().map(BlockId::as_str).collect();
        assert_eq!(ids, vec!["a", "a1", "a2"]);
        assert!(index.descendants(&BlockId::new("nope")).is_empty());
    }

    #[test]
    fn remove_subtree_deletes_descendants_and_keeps_the_rest() {
        // A -> B -> C: deleting B removes B and C, leaves A.
        let blocks = [
            Block::new("A", "column"),
            Block::new("B", "column").with_parent("A"),
            Block::new("C", "paragraph").with_parent("B"),
        ];
        let index = BlockIndex::from_blocks(&blocks);
        let next = index.remove_subtree(&BlockId::new("B"));
        assert!(next.contains(&BlockId::new("A")));
        assert!(!next.contains(&BlockId::new("B")));
        assert!(!next.contains(&BlockId::new("C")));
        assert!(next.children(Some(&BlockId::new("A"))).is_empty());
        // The original snapshot is untouched.
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn insert_places_block_at_zone() {
        let index = sample_tree();
        let next = index.insert(
            Block::new("a15", "paragraph"),
            &DropZone::After(BlockId::new("a1")),
            OrderStrategy::Reindex,
        );
        let a = BlockId::new("a");
        let children: Vec<&str> = next
            .children(Some(&a))
            .iter()
            .map(BlockId::as_str)
            .collect();
        assert_eq!(children, vec!["a1", "a15", "a2"]);
        assert_eq!(
            next.get(&BlockId::new("a15")).unwrap().parent,
            Some(BlockId::new("a"))
        );
    }

    #[test]
    fn insert_fractional_generates_key_between_neighbors() {
        let index = frac_tree();
        let next = index.insert(
            Block::new("mid", "paragraph"),
            &DropZone::After(BlockId::new("x")),
            OrderStrategy::Fractional,
        );
        let x = next.get(&BlockId::new("x")).unwrap().order.clone();
        let y = next.get(&BlockId::new("y")).unwrap().order.clone();
        let mid = next.get(&BlockId::new("mid")).unwrap().order.clone();
        assert!(x < mid && mid < y, "{x} < {mid} < {y} should hold");
    }

    #[test]
    #[should_panic(expected = "dangling block id in drop zone")]
    fn insert_at_dangling_zone_is_fatal() {
        let index = sample_tree();
        let _ = index.insert(
            Block::new("n", "paragraph"),
            &DropZone::Before(BlockId::new("missing")),
            OrderStrategy::Reindex,
        );
    }

    #[test]
    fn depths() {
        let index = sample_tree();
        assert_eq!(index.block_depth(&BlockId::new("a")), 1);
        assert_eq!(index.block_depth(&BlockId::new("a1")), 2);
        assert_eq!(index.block_depth(&BlockId::new("nope")), 0);
        assert_eq!(index.subtree_depth(&BlockId::new("a")), 2);
        assert_eq!(index.subtree_depth(&BlockId::new("b")), 1);
    }

    #[test]
    fn validate_accepts_well_formed_trees() {
        assert!(sample_tree().validate().is_empty());
        assert!(BlockIndex::new().validate().is_empty());
    }

    #[test]
    fn validate_reports_dangling_and_orphans() {
        let mut index = sample_tree();
        // A sibling entry without a block.
        index
            .by_parent
            .get_mut(&None)
            .unwrap()
            .push(BlockId::new("ghost"));
        // A block pointing at a parent that is gone.
        index.by_id.insert(
            BlockId::new("stray"),
            Block::new("stray", "paragraph").with_parent("gone"),
        );
        let issues = index.validate();
        assert!(issues.contains(&TreeIssue::UnknownSibling {
            id: BlockId::new("ghost"),
            parent: None,
        }));
        assert!(issues.contains(&TreeIssue::OrphanParent {
            id: BlockId::new("stray"),
            parent: BlockId::new("gone"),
        }));
        assert!(issues.contains(&TreeIssue::Unindexed {
            id: BlockId::new("stray"),
        }));
    }

    #[test]
    fn validate_reports_duplicates_and_cycles() {
        let mut index = sample_tree();
        // "b" listed twice.
        index
            .by_parent
            .get_mut(&None)
            .unwrap()
            .push(BlockId::new("b"));
        let issues = index.validate();
        assert!(issues.contains(&TreeIssue::DuplicateSibling {
            id: BlockId::new("b"),
        }));

        // Two blocks forming a detached cycle.
        let mut cyclic = BlockIndex::new();
        cyclic
            .by_id
            .insert(BlockId::new("p"), Block::new("p", "column").with_parent("q"));
        cyclic
            .by_id
            .insert(BlockId::new("q"), Block::new("q", "column").with_parent("p"));
        cyclic
            .by_parent
            .insert(Some(BlockId::new("p")), vec![BlockId::new("q")]);
        cyclic
            .by_parent
            .insert(Some(BlockId::new("q")), vec![BlockId::new("p")]);
        let issues = cyclic.validate();
        assert!(
            issues.iter().any(|i| matches!(i, TreeIssue::Cycle { .. })),
            "cycle must be reported, got {issues:?}"
        );
    }
}
