// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion between the flat index and a nested tree shape.
//!
//! Persistence and transport layers usually want the recursive form; the
//! engine wants the normalized one. [`to_nested`] and [`from_nested`] convert
//! between them losslessly for well-formed trees (every block reachable from
//! the root lists, no cycles).

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use canopy_order::{OrderKey, initial_keys};
use hashbrown::HashSet;

use crate::index::BlockIndex;
use crate::types::{Block, BlockId};

/// A block with its children attached in place of a parent reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NestedBlock {
    /// Unique id of this block.
    pub id: BlockId,
    /// The block type.
    pub kind: String,
    /// Sibling order value, carried verbatim so round-trips preserve
    /// fractional keys.
    pub order: OrderKey,
    /// Content fields.
    pub attrs: BTreeMap<String, String>,
    /// Children in sibling order.
    pub children: Vec<NestedBlock>,
}

/// Convert an index into nested root trees, in sibling order.
///
/// Blocks unreachable from the root lists (malformed input) are omitted; for
/// well-formed trees the conversion is lossless.
pub fn to_nested(index: &BlockIndex) -> Vec<NestedBlock> {
    let mut visited: HashSet<BlockId> = HashSet::new();
    index
        .roots()
        .iter()
        .filter_map(|id| nest(index, id, &mut visited))
        .collect()
}

fn nest(index: &BlockIndex, id: &BlockId, visited: &mut HashSet<BlockId>) -> Option<NestedBlock> {
    if !visited.insert(id.clone()) {
        // Cyclic input; drop the repeated branch rather than loop.
        return None;
    }
    let block = index.get(id)?;
    let children = index
        .children(Some(id))
        .iter()
        .filter_map(|child| nest(index, child, visited))
        .collect();
    Some(NestedBlock {
        id: block.id.clone(),
        kind: block.kind.clone(),
        order: block.order.clone(),
        attrs: block.attrs.clone(),
        children,
    })
}

/// Rebuild a flat index from nested root trees.
///
/// Parent references are derived from the nesting; sibling lists follow the
/// `children` vectors.
pub fn from_nested(roots: &[NestedBlock]) -> BlockIndex {
    let mut blocks = Vec::new();
    flatten(roots, None, &mut blocks);
    BlockIndex::from_blocks(&blocks)
}

fn flatten(nodes: &[NestedBlock], parent: Option<&BlockId>, out: &mut Vec<Block>) {
    for node in nodes {
        out.push(Block {
            id: node.id.clone(),
            kind: node.kind.clone(),
            parent: parent.cloned(),
            order: node.order.clone(),
            attrs: node.attrs.clone(),
        });
        flatten(&node.children, Some(&node.id), out);
    }
}

/// Assign fresh fractional keys to every block, sibling list by sibling list.
///
/// This is the migration step from the integer regime to the fractional one:
/// list order is kept, and each list gets evenly spread keys from
/// [`initial_keys`]. The input index is untouched.
pub fn init_fractional_order(index: &BlockIndex) -> BlockIndex {
    let mut next = index.clone();
    let lists: Vec<Vec<BlockId>> = next.by_parent.values().cloned().collect();
    for list in lists {
        let keys = initial_keys(list.len());
        for (id, key) in list.iter().zip(keys) {
            if let Some(block) = next.by_id.get_mut(id) {
                block.order = OrderKey::Fractional(key);
            }
        }
    }
    next
}
