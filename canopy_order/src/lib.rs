// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Order: sibling ordering strategies for block trees.
//!
//! A block tree keeps an explicit order among siblings. This crate provides the
//! two strategies Canopy supports for representing that order, and the key
//! arithmetic behind the second one:
//!
//! - **Integer reindexing** ([`OrderStrategy::Reindex`]): every sibling carries
//!   its 0-based position. Simple and deterministic, but every structural
//!   change rewrites the `order` of the whole affected sibling list, so it is
//!   unsuitable when independent observers must apply moves without a full
//!   list resync.
//! - **Fractional keys** ([`OrderStrategy::Fractional`]): every sibling carries
//!   a [`FracKey`], a short string ordered by plain lexicographic comparison.
//!   A move touches only the moved block, because a fresh key can always be
//!   generated between any two neighbors ([`key_between`]), no matter how
//!   often a gap has already been subdivided.
//!
//! ## Example
//!
//! ```rust
//! use canopy_order::{key_between, n_keys_between};
//!
//! // Seed two keys, then squeeze a third one between them.
//! let keys = n_keys_between(None, None, 2);
//! let mid = key_between(Some(&keys[0]), Some(&keys[1]));
//! assert!(keys[0] < mid && mid < keys[1]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod key;
mod strategy;

pub use key::{FracKey, compare_keys, initial_keys, key_between, n_keys_between};
pub use strategy::{OrderKey, OrderStrategy};
