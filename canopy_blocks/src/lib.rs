// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A normalized block tree with drag-and-drop reparenting.
//!
//! This crate is the structural core of a hierarchical block editor. State is
//! a [`BlockIndex`]: flat storage of typed [`Block`]s plus ordered sibling
//! lists, rebuilt copy-on-write by every mutator so callers can hold stable
//! snapshots. On top of it sit the pieces a drag gesture needs:
//!
//! - [`DropZone`]: the string protocol renderers use to label drop targets
//!   (`before-x`, `after-x`, `into-x`, `end-x`, `root-start`, `root-end`).
//! - [`BlockIndex::reparent`] and [`BlockIndex::reparent_many`]: compute the
//!   candidate tree for a drop, rejecting cycles, leaf nesting, and
//!   over-deep results by returning `None`.
//! - [`to_nested`] / [`from_nested`]: lossless conversion to and from the
//!   recursive shape persistence layers prefer.
//! - [`BlockIndex::validate`]: structural diagnostics for untrusted input.
//!
//! Sibling order is delegated to [`canopy_order`]: the same index works with
//! dense integer reindexing or with fractional keys, chosen per call via
//! [`OrderStrategy`](canopy_order::OrderStrategy).
//!
//! The crate is `no_std` (with `alloc`) and has no opinion on rendering,
//! pointer input, or persistence.

#![no_std]

extern crate alloc;

mod index;
mod nested;
mod reparent;
mod types;
mod zone;

pub use index::BlockIndex;
pub use nested::{NestedBlock, from_nested, init_fractional_order, to_nested};
pub use types::{Block, BlockId, ContainerKinds, TreeIssue};
pub use zone::{DropZone, ZoneKind};
