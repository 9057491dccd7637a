// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tree facade: everything a drag-and-drop block UI talks to.
//!
//! [`TreeController`] ties the Canopy engine crates together behind one
//! object: committed block state ([`canopy_blocks`]), sibling ordering
//! ([`canopy_order`]), pointer-to-zone resolution ([`canopy_collision`]),
//! undo history ([`canopy_history`]), and a synchronous event emitter. It
//! owns the drag lifecycle state machine:
//!
//! ```text
//! Idle --start_drag--> Dragging --end_drag/cancel_drag--> Idle
//! ```
//!
//! The facade renders nothing and captures no input. External *sensors*
//! translate physical gestures into `start_drag` / `update_drag` /
//! `end_drag` / `cancel_drag` calls (in that order), and external renderers
//! consume [`TreeEvent`]s, treating the block arrays they carry as the sole
//! source of truth. During a drag the committed blocks are never touched;
//! candidate states live on the side until the drop commits, so cancelling
//! costs nothing.
//!
//! Time is caller-supplied milliseconds. The debounced drop preview is
//! driven by passing `now` to [`TreeController::update_drag`] and pumping
//! [`TreeController::tick`]; no timers run inside the crate.

#![no_std]

extern crate alloc;

mod controller;
mod events;

pub use controller::{
    DEFAULT_HISTORY_STEPS, DEFAULT_PREVIEW_DEBOUNCE_MS, TreeConfig, TreeController,
};
pub use events::{Emitter, EventMask, HandlerId, TreeEvent};
