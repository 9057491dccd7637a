// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drop-zone id protocol.
//!
//! Renderers label their drop targets with zone-id strings; collision
//! detection picks one of those strings, and the reparent engine decodes it
//! back into a placement. The wire forms are:
//!
//! | zone id            | meaning                                    |
//! |--------------------|--------------------------------------------|
//! | `before-<blockId>` | insert as the previous sibling of the block |
//! | `after-<blockId>`  | insert as the next sibling of the block     |
//! | `into-<blockId>`   | insert as the first child of a container    |
//! | `end-<blockId>`    | insert as the last child of a container     |
//! | `root-start`       | insert first at the root level              |
//! | `root-end`         | insert last at the root level               |
//!
//! Block ids may themselves contain `-`; only the first separator after the
//! relation prefix is meaningful.

use core::fmt;

use crate::types::BlockId;

/// A decoded drop target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropZone {
    /// Previous sibling of the referenced block.
    Before(BlockId),
    /// Next sibling of the referenced block.
    After(BlockId),
    /// First child of the referenced container block.
    Into(BlockId),
    /// Last child of the referenced container block.
    End(BlockId),
    /// First position at the root level.
    RootStart,
    /// Last position at the root level.
    RootEnd,
}

/// Coarse classification of a zone id, as exposed to renderers that only
/// style the three visual cases.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ZoneKind {
    /// The zone inserts before an existing block.
    Before,
    /// The zone inserts after an existing block.
    After,
    /// The zone inserts inside a container (or at the root level).
    Into,
}

impl DropZone {
    /// Parse a zone-id string. Returns `None` for unrecognized encodings.
    ///
    /// ```rust
    /// use canopy_blocks::DropZone;
    ///
    /// let zone = DropZone::parse("after-note-12").unwrap();
    /// assert_eq!(zone.target().unwrap().as_str(), "note-12");
    /// ```
    pub fn parse(zone: &str) -> Option<Self> {
        match zone {
            "root-start" => return Some(Self::RootStart),
            "root-end" => return Some(Self::RootEnd),
            _ => {}
        }
        let (relation, id) = zone.split_once('-')?;
        if id.is_empty() {
            return None;
        }
        let id = BlockId::new(id);
        match relation {
            "before" => Some(Self::Before(id)),
            "after" => Some(Self::After(id)),
            "into" => Some(Self::Into(id)),
            "end" => Some(Self::End(id)),
            _ => None,
        }
    }

    /// The referenced block id, if the zone names one.
    pub fn target(&self) -> Option<&BlockId> {
        match self {
            Self::Before(id) | Self::After(id) | Self::Into(id) | Self::End(id) => Some(id),
            Self::RootStart | Self::RootEnd => None,
        }
    }

    /// Coarse before/after/into classification.
    pub fn kind(&self) -> ZoneKind {
        match self {
            Self::Before(_) => ZoneKind::Before,
            Self::After(_) => ZoneKind::After,
            Self::Into(_) | Self::End(_) | Self::RootStart | Self::RootEnd => ZoneKind::Into,
        }
    }
}

impl fmt::Display for DropZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before(id) => write!(f, "before-{id}"),
            Self::After(id) => write!(f, "after-{id}"),
            Self::Into(id) => write!(f, "into-{id}"),
            Self::End(id) => write!(f, "end-{id}"),
            Self::RootStart => f.write_str("root-start"),
            Self::RootEnd => f.write_str("root-end"),
        }
    }
}
