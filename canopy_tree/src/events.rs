// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Facade events and the per-instance emitter.
//!
//! Dispatch is synchronous and unbuffered: [`Emitter::emit`] calls every
//! interested handler before returning, in subscription order. Handlers
//! subscribe with an [`EventMask`] so a renderer that only cares about
//! committed state does not pay for per-frame preview traffic.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use canopy_blocks::{Block, BlockId};

bitflags::bitflags! {
    /// Subscription filter for [`TreeEvent`]s.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct EventMask: u16 {
        /// The committed block array changed.
        const BLOCKS_CHANGE = 1 << 0;
        /// A drag started.
        const DRAG_START = 1 << 1;
        /// The debounced drag preview fired.
        const DRAG_PREVIEW = 1 << 2;
        /// A drag ended, by commit or cancel.
        const DRAG_END = 1 << 3;
        /// A block's expansion state toggled.
        const EXPAND_CHANGE = 1 << 4;
        /// The hovered block changed.
        const HOVER_CHANGE = 1 << 5;
        /// A block was inserted.
        const BLOCK_ADD = 1 << 6;
        /// A block (and its subtree) was deleted.
        const BLOCK_DELETE = 1 << 7;
        /// The selection changed.
        const SELECTION_CHANGE = 1 << 8;
    }
}

/// An event from the tree facade.
///
/// Block arrays carried by events are the facade's emitted truth; renderers
/// must not mutate them in place.
#[derive(Clone, Debug, PartialEq)]
pub enum TreeEvent {
    /// The committed block array changed (drop commit, insert, delete,
    /// undo, redo).
    BlocksChange {
        /// The new committed blocks, in depth-first order.
        blocks: Vec<Block>,
    },
    /// A drag started.
    DragStart {
        /// The block under the pointer.
        active: BlockId,
        /// The full dragged set (equals `[active]` for single drags).
        dragged: Vec<BlockId>,
    },
    /// The debounced preview of the pending drop fired.
    DragPreview {
        /// The candidate blocks the drop would commit, in depth-first
        /// order.
        blocks: Vec<Block>,
        /// The zone the candidate was computed for.
        zone: String,
    },
    /// A drag ended.
    DragEnd {
        /// `true` when the drag was cancelled rather than committed.
        cancelled: bool,
    },
    /// A block's expansion state toggled.
    ExpandChange {
        /// The toggled block.
        id: BlockId,
        /// Its new state.
        expanded: bool,
    },
    /// The hovered block changed.
    HoverChange {
        /// The newly hovered block, or `None` for no hover.
        hover: Option<BlockId>,
    },
    /// A block was inserted.
    BlockAdd {
        /// The inserted block's id.
        id: BlockId,
    },
    /// A block and its subtree were deleted.
    BlockDelete {
        /// The deleted root id.
        id: BlockId,
    },
    /// The selection changed.
    SelectionChange {
        /// The new selection.
        selection: Vec<BlockId>,
    },
}

impl TreeEvent {
    /// The mask bit this event matches.
    pub fn mask(&self) -> EventMask {
        match self {
            Self::BlocksChange { .. } => EventMask::BLOCKS_CHANGE,
            Self::DragStart { .. } => EventMask::DRAG_START,
            Self::DragPreview { .. } => EventMask::DRAG_PREVIEW,
            Self::DragEnd { .. } => EventMask::DRAG_END,
            Self::ExpandChange { .. } => EventMask::EXPAND_CHANGE,
            Self::HoverChange { .. } => EventMask::HOVER_CHANGE,
            Self::BlockAdd { .. } => EventMask::BLOCK_ADD,
            Self::BlockDelete { .. } => EventMask::BLOCK_DELETE,
            Self::SelectionChange { .. } => EventMask::SELECTION_CHANGE,
        }
    }
}

/// Handle for removing a subscription.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Box<dyn FnMut(&TreeEvent)>;

/// Per-instance pub-sub dispatcher.
#[derive(Default)]
pub struct Emitter {
    handlers: Vec<(HandlerId, EventMask, Handler)>,
    next_id: u64,
}

impl core::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Emitter")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl Emitter {
    /// Register a handler for the events selected by `mask`.
    pub fn subscribe(&mut self, mask: EventMask, handler: impl FnMut(&TreeEvent) + 'static) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, mask, Box::new(handler)));
        id
    }

    /// Remove a subscription. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: HandlerId) {
        self.handlers.retain(|(hid, _, _)| *hid != id);
    }

    /// Dispatch an event to every matching handler, synchronously.
    pub fn emit(&mut self, event: &TreeEvent) {
        for (_, mask, handler) in &mut self.handlers {
            if mask.contains(event.mask()) {
                handler(event);
            }
        }
    }
}
