// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Order key values and the strategy selector.

use core::cmp::Ordering;
use core::fmt;

use crate::key::FracKey;

/// How sibling order is represented and maintained in a tree.
///
/// One tree uses exactly one strategy; the two [`OrderKey`] variants must not
/// be mixed within a tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OrderStrategy {
    /// Integer positions. Every structural change triggers a full `0..n-1`
    /// rewrite of the affected sibling list on the next ordered walk, so the
    /// stored positions are derived data.
    Reindex,
    /// Fractional string keys. The key on each block is authoritative; a move
    /// regenerates only the moved block's key.
    Fractional,
}

/// The order value carried by a block.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OrderKey {
    /// 0-based sibling position, used by [`OrderStrategy::Reindex`].
    Index(i64),
    /// Fractional key, used by [`OrderStrategy::Fractional`].
    Fractional(FracKey),
}

impl OrderKey {
    /// The integer position, if this is an [`OrderKey::Index`].
    pub fn index(&self) -> Option<i64> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Fractional(_) => None,
        }
    }

    /// The fractional key, if this is an [`OrderKey::Fractional`].
    pub fn fractional(&self) -> Option<&FracKey> {
        match self {
            Self::Index(_) => None,
            Self::Fractional(k) => Some(k),
        }
    }
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Index(a), Self::Index(b)) => a.cmp(b),
            (Self::Fractional(a), Self::Fractional(b)) => a.cmp(b),
            // A well-formed tree never mixes variants; the cross-variant
            // ordering only needs to be total and consistent.
            (Self::Index(_), Self::Fractional(_)) => Ordering::Less,
            (Self::Fractional(_), Self::Index(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<i64> for OrderKey {
    fn from(i: i64) -> Self {
        Self::Index(i)
    }
}

impl From<FracKey> for OrderKey {
    fn from(k: FracKey) -> Self {
        Self::Fractional(k)
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Fractional(k) => write!(f, "{k}"),
        }
    }
}
