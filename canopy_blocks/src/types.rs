// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Block data model and diagnostic types.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;

use canopy_order::OrderKey;

/// Identifier of a block.
///
/// Ids are opaque strings chosen by the caller (typically UUIDs or
/// collaborative-editing ids); they are shared across replicas, so they are
/// not generational handles.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(String);

impl BlockId {
    /// Create an id from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlockId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for BlockId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for BlockId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A typed tree node.
///
/// `parent` of `None` places the block at the root level. `order` is the
/// block's sibling order value; which variant it carries depends on the
/// tree's [`OrderStrategy`](canopy_order::OrderStrategy) and must not vary
/// within one tree. `attrs` holds the open-ended content fields (title,
/// payload, and so on) that the structural engine never interprets; the merge
/// engine partitions them against the structural fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// Unique id of this block.
    pub id: BlockId,
    /// The block type, e.g. `"paragraph"` or `"column"`. Whether a block may
    /// own children is decided by the caller's [`ContainerKinds`], keyed on
    /// this field.
    pub kind: String,
    /// Parent block, or `None` at the root level.
    pub parent: Option<BlockId>,
    /// Sibling order value.
    pub order: OrderKey,
    /// Content fields, untouched by structural operations.
    pub attrs: BTreeMap<String, String>,
}

impl Block {
    /// Create a root-level block with integer order `0` and no attrs.
    pub fn new(id: impl Into<BlockId>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            parent: None,
            order: OrderKey::Index(0),
            attrs: BTreeMap::new(),
        }
    }

    /// Set the parent.
    pub fn with_parent(mut self, parent: impl Into<BlockId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the order value.
    pub fn with_order(mut self, order: impl Into<OrderKey>) -> Self {
        self.order = order.into();
        self
    }

    /// Add a content attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

/// The set of block kinds allowed to own children.
///
/// The root level (`parent == None`) always accepts children; this set gates
/// only blocks. A kind absent from the set is a leaf kind: reparenting into
/// it is rejected and [`validate`](crate::BlockIndex::validate) does not
/// consult it (structural validity is independent of the kind policy).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainerKinds(BTreeSet<String>);

impl ContainerKinds {
    /// An empty set: no block may own children.
    pub fn none() -> Self {
        Self::default()
    }

    /// Build the set from kind names.
    pub fn from_kinds<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(kinds.into_iter().map(Into::into).collect())
    }

    /// Whether blocks of `kind` may own children.
    pub fn allows_children(&self, kind: &str) -> bool {
        self.0.contains(kind)
    }
}

/// A structural problem found by [`BlockIndex::validate`](crate::BlockIndex::validate).
///
/// Issues are diagnostics only; no mutator checks them automatically, and
/// none of them is ever raised as a panic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeIssue {
    /// An id appears more than once across sibling lists.
    DuplicateSibling {
        /// The repeated id.
        id: BlockId,
    },
    /// A sibling list references an id that has no block.
    UnknownSibling {
        /// The dangling id.
        id: BlockId,
        /// The list it was found in.
        parent: Option<BlockId>,
    },
    /// A block exists but appears in no sibling list.
    Unindexed {
        /// The unlisted block.
        id: BlockId,
    },
    /// A block's `parent` field references an id that has no block.
    OrphanParent {
        /// The block with the dangling reference.
        id: BlockId,
        /// The missing parent id.
        parent: BlockId,
    },
    /// A block is its own ancestor.
    Cycle {
        /// A block on the cycle.
        id: BlockId,
    },
}

impl fmt::Display for TreeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateSibling { id } => {
                write!(f, "block '{id}' appears in more than one sibling position")
            }
            Self::UnknownSibling { id, parent } => match parent {
                Some(p) => write!(f, "sibling list of '{p}' references unknown block '{id}'"),
                None => write!(f, "root sibling list references unknown block '{id}'"),
            },
            Self::Unindexed { id } => {
                write!(f, "block '{id}' is missing from every sibling list")
            }
            Self::OrphanParent { id, parent } => {
                write!(f, "block '{id}' references unknown parent '{parent}'")
            }
            Self::Cycle { id } => {
                write!(f, "block '{id}' is part of a parent cycle")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn block_builder() {
        let b = Block::new("b1", "paragraph")
            .with_parent("root")
            .with_attr("title", "Hello");
        assert_eq!(b.id.as_str(), "b1");
        assert_eq!(b.parent.as_ref().map(BlockId::as_str), Some("root"));
        assert_eq!(b.attrs.get("title").map(String::as_str), Some("Hello"));
    }

    #[test]
    fn container_kinds_gate() {
        let kinds = ContainerKinds::from_kinds(["column", "toggle"]);
        assert!(kinds.allows_children("column"));
        assert!(!kinds.allows_children("paragraph"));
        assert!(!ContainerKinds::none().allows_children("column"));
    }

    #[test]
    fn issue_display_names_the_block() {
        let issue = TreeIssue::OrphanParent {
            id: BlockId::new("a"),
            parent: BlockId::new("gone"),
        };
        assert_eq!(format!("{issue}"), "block 'a' references unknown parent 'gone'");
    }
}
