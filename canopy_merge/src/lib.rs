// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conflict-aware merging of concurrent block edits.
//!
//! Two pieces, both deterministic and framework-free:
//!
//! - [`merge_block_versions`]: a per-field union of a local and a remote
//!   block array. Structural fields (by default parent and order) win from
//!   the remote side, content fields win from the local side. This is a
//!   fixed policy, **not** a general CRDT: there is no causal history and no
//!   negotiation, so true multi-writer collaboration needs a real CRDT layer
//!   above this crate.
//! - [`SyncGate`]: the deferred-sync pattern for realtime sessions. While a
//!   blocking local action (typically a drag) is in progress, remote updates
//!   are parked, keeping only the most recent payload; when the action ends,
//!   the gate resolves exactly once.
//!
//! ```rust
//! use canopy_blocks::Block;
//! use canopy_merge::{merge_block_versions, MergeOptions};
//! use canopy_order::FracKey;
//!
//! let local = [Block::new("1", "paragraph").with_attr("title", "Local")];
//! let remote = [Block::new("1", "paragraph")
//!     .with_order(FracKey::new("a0"))
//!     .with_attr("title", "Remote")];
//! let merged = merge_block_versions(&local, &remote, &MergeOptions::default());
//! // Structure from remote, content from local.
//! assert_eq!(merged[0].order.fractional().unwrap().as_str(), "a0");
//! assert_eq!(merged[0].attrs["title"], "Local");
//! ```

#![no_std]

extern crate alloc;

mod gate;

pub use gate::{ResolveStrategy, SyncGate};

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;
use canopy_blocks::{Block, BlockId};
use hashbrown::{HashMap, HashSet};

/// Names of the structural block fields.
///
/// `"parent"` and `"order"` address the struct fields of those names; any
/// other string addresses an `attrs` entry (so a caller can promote, say, a
/// `"collapsed"` attribute to structural). `"kind"` is also recognized as a
/// struct field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOptions {
    /// Fields taken from the remote side. Everything else stays local.
    pub structural_fields: BTreeSet<String>,
}

impl Default for MergeOptions {
    /// Parent and order are structural; all content is local-preferred.
    fn default() -> Self {
        Self {
            structural_fields: ["parent", "order"].into_iter().map(String::from).collect(),
        }
    }
}

impl MergeOptions {
    /// Build options from field names.
    pub fn structural<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            structural_fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Merge two concurrently produced block arrays field by field.
///
/// For every id present in `remote`, the output block takes the structural
/// fields from `remote` and every other field from the matching `local`
/// block. Ids absent from `local` are additions and pass through from
/// `remote` whole; ids absent from `remote` pass through from `local`
/// unchanged. Output order is remote order followed by the local-only
/// blocks in local order.
pub fn merge_block_versions(local: &[Block], remote: &[Block], options: &MergeOptions) -> Vec<Block> {
    let local_by_id: HashMap<&BlockId, &Block> = local.iter().map(|b| (&b.id, b)).collect();
    let remote_ids: HashSet<&BlockId> = remote.iter().map(|b| &b.id).collect();

    let mut out = Vec::with_capacity(remote.len());
    for theirs in remote {
        match local_by_id.get(&theirs.id) {
            Some(ours) => out.push(merge_one(ours, theirs, options)),
            None => out.push(theirs.clone()),
        }
    }
    for ours in local {
        if !remote_ids.contains(&ours.id) {
            out.push(ours.clone());
        }
    }
    out
}

fn merge_one(ours: &Block, theirs: &Block, options: &MergeOptions) -> Block {
    let mut merged = ours.clone();
    for field in &options.structural_fields {
        match field.as_str() {
            "parent" => merged.parent = theirs.parent.clone(),
            "order" => merged.order = theirs.order.clone(),
            "kind" => merged.kind = theirs.kind.clone(),
            attr => match theirs.attrs.get(attr) {
                Some(value) => {
                    merged.attrs.insert(field.clone(), value.clone());
                }
                None => {
                    merged.attrs.remove(attr);
                }
            },
        }
    }
    merged
}
