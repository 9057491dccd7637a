// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tree controller: committed state plus the drag lifecycle.

use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use canopy_blocks::{Block, BlockId, BlockIndex, ContainerKinds, DropZone};
use canopy_collision::{Candidate, CollisionStrategy};
use canopy_history::History;
use canopy_order::OrderStrategy;
use kurbo::Rect;
use smallvec::SmallVec;

use crate::events::{Emitter, EventMask, HandlerId, TreeEvent};

/// Default trailing-edge preview debounce, in milliseconds.
pub const DEFAULT_PREVIEW_DEBOUNCE_MS: u64 = 50;

/// Default undo depth.
pub const DEFAULT_HISTORY_STEPS: usize = 100;

/// Construction-time configuration for a [`TreeController`].
#[derive(Clone, Debug)]
pub struct TreeConfig {
    /// Block kinds allowed to own children.
    pub container_kinds: ContainerKinds,
    /// Sibling ordering regime. Must not change over the tree's lifetime.
    pub strategy: OrderStrategy,
    /// Maximum nesting depth, if any (roots have depth 1).
    pub max_depth: Option<usize>,
    /// Undo depth; `0` disables history.
    pub history_steps: usize,
    /// Quiet period before a pending drop preview is emitted.
    pub preview_debounce_ms: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            container_kinds: ContainerKinds::none(),
            strategy: OrderStrategy::Reindex,
            max_depth: None,
            history_steps: DEFAULT_HISTORY_STEPS,
            preview_debounce_ms: DEFAULT_PREVIEW_DEBOUNCE_MS,
        }
    }
}

impl TreeConfig {
    /// Set the container kinds.
    pub fn with_container_kinds(mut self, kinds: ContainerKinds) -> Self {
        self.container_kinds = kinds;
        self
    }

    /// Set the ordering strategy.
    pub fn with_strategy(mut self, strategy: OrderStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the depth limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Set the undo depth (`0` disables history).
    pub fn with_history_steps(mut self, steps: usize) -> Self {
        self.history_steps = steps;
        self
    }

    /// Set the preview debounce.
    pub fn with_preview_debounce_ms(mut self, ms: u64) -> Self {
        self.preview_debounce_ms = ms;
        self
    }
}

/// In-flight drag bookkeeping.
#[derive(Debug)]
struct DragState {
    dragged: SmallVec<[BlockId; 4]>,
    /// The committed index at `start_drag` time. Candidates are always
    /// recomputed from here, never from a previous candidate, so pointer
    /// noise cannot accumulate drift.
    snapshot: BlockIndex,
    last_zone: Option<String>,
    candidate: Option<BlockIndex>,
    preview_due: Option<u64>,
}

/// The tree facade.
///
/// Owns the committed block state, the drag-lifecycle state machine
/// (`Idle -> Dragging -> Idle` via commit or cancel), optional undo history,
/// the collision strategy used to resolve pointer geometry to zone ids, and
/// the UI-adjacent expansion/hover/selection state. All methods are
/// synchronous; time enters only as caller-supplied millisecond timestamps.
///
/// Sensors must drive the machine in order: [`start_drag`](Self::start_drag),
/// any number of [`update_drag`](Self::update_drag) and [`tick`](Self::tick)
/// calls, then [`end_drag`](Self::end_drag) or
/// [`cancel_drag`](Self::cancel_drag). Renderers must treat the block arrays
/// carried by emitted events as the sole source of truth.
///
/// ```rust
/// use canopy_blocks::Block;
/// use canopy_collision::ClosestCenter;
/// use canopy_tree::{TreeConfig, TreeController};
///
/// let blocks = vec![Block::new("a", "paragraph"), Block::new("b", "paragraph")];
/// let mut tree = TreeController::new(blocks, TreeConfig::default(), ClosestCenter);
///
/// assert!(tree.start_drag(&"b".into(), &[]));
/// assert!(tree.update_drag("before-a", 1000));
/// assert!(tree.end_drag());
/// let blocks = tree.blocks();
/// let ids: Vec<&str> = blocks.iter().map(|b| b.id.as_str()).collect();
/// assert_eq!(ids, ["b", "a"]);
/// ```
#[derive(Debug)]
pub struct TreeController<S> {
    config: TreeConfig,
    committed: BlockIndex,
    collision: S,
    history: Option<History>,
    emitter: Emitter,
    drag: Option<DragState>,
    expanded: BTreeSet<BlockId>,
    hover: Option<BlockId>,
    selection: Vec<BlockId>,
}

impl<S: CollisionStrategy> TreeController<S> {
    /// Build a controller over an initial flat block array.
    pub fn new(blocks: Vec<Block>, config: TreeConfig, collision: S) -> Self {
        let committed = BlockIndex::from_blocks(&blocks);
        let history = (config.history_steps > 0)
            .then(|| History::new(committed.ordered_blocks(config.strategy), config.history_steps));
        Self {
            config,
            committed,
            collision,
            history,
            emitter: Emitter::default(),
            drag: None,
            expanded: BTreeSet::new(),
            hover: None,
            selection: Vec::new(),
        }
    }

    /// The committed blocks, in depth-first order.
    pub fn blocks(&self) -> Vec<Block> {
        self.committed.ordered_blocks(self.config.strategy)
    }

    /// The committed index.
    pub fn index(&self) -> &BlockIndex {
        &self.committed
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Register an event handler for the events selected by `mask`.
    pub fn subscribe(
        &mut self,
        mask: EventMask,
        handler: impl FnMut(&TreeEvent) + 'static,
    ) -> HandlerId {
        self.emitter.subscribe(mask, handler)
    }

    /// Remove an event handler.
    pub fn unsubscribe(&mut self, id: HandlerId) {
        self.emitter.unsubscribe(id)
    }

    /// Resolve pointer geometry to a zone id through the collision strategy.
    ///
    /// Candidates are the drop-zone rectangles the renderer currently shows;
    /// the sensor feeds the winner to [`update_drag`](Self::update_drag).
    pub fn resolve_zone(&mut self, candidates: &[Candidate], pointer: Rect) -> Option<String> {
        self.collision.pick(candidates, pointer).map(|hit| hit.zone)
    }

    /// Begin a drag of `active`, or of the multi-select set `dragged` when it
    /// is non-empty.
    ///
    /// Returns `false` without side effects while a drag is already in
    /// progress or when any id is unknown. On success the committed index is
    /// snapshotted, any collision lock from a previous drag is cleared, and
    /// `DragStart` is emitted.
    pub fn start_drag(&mut self, active: &BlockId, dragged: &[BlockId]) -> bool {
        if self.drag.is_some() || !self.committed.contains(active) {
            return false;
        }
        if dragged.iter().any(|id| !self.committed.contains(id)) {
            return false;
        }
        let dragged: SmallVec<[BlockId; 4]> = if dragged.is_empty() {
            SmallVec::from(core::slice::from_ref(active))
        } else {
            SmallVec::from(dragged)
        };
        self.collision.reset();
        let event = TreeEvent::DragStart {
            active: active.clone(),
            dragged: dragged.to_vec(),
        };
        self.drag = Some(DragState {
            dragged,
            snapshot: self.committed.clone(),
            last_zone: None,
            candidate: None,
            preview_due: None,
        });
        self.emitter.emit(&event);
        true
    }

    /// Offer the current target zone id during a drag.
    ///
    /// The reparent candidate is recomputed from the start-of-drag snapshot
    /// (single- or multi-block depending on the dragged set) and cached for
    /// the eventual commit; a rejected zone clears the cache, making the
    /// pending drop a no-op. A trailing-edge `DragPreview` is scheduled
    /// `preview_debounce_ms` after `now` and delivered by
    /// [`tick`](Self::tick).
    ///
    /// Repeated calls with the same zone id are idempotent and do not
    /// reschedule the preview. Returns `false` when idle or when the zone id
    /// does not parse.
    pub fn update_drag(&mut self, zone: &str, now: u64) -> bool {
        let debounce = self.config.preview_debounce_ms;
        let kinds = self.config.container_kinds.clone();
        let strategy = self.config.strategy;
        let max_depth = self.config.max_depth;
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        let Some(parsed) = DropZone::parse(zone) else {
            return false;
        };
        if drag.last_zone.as_deref() == Some(zone) {
            return true;
        }
        drag.candidate = match drag.dragged.as_slice() {
            [single] => drag
                .snapshot
                .reparent(single, &parsed, &kinds, strategy, max_depth),
            many => drag
                .snapshot
                .reparent_many(many, &parsed, &kinds, strategy, max_depth),
        };
        drag.last_zone = Some(zone.to_string());
        drag.preview_due = Some(now + debounce);
        true
    }

    /// Pump the preview debounce.
    ///
    /// Emits the pending `DragPreview` once its quiet period has elapsed.
    /// Safe to call at any cadence, in or out of a drag.
    pub fn tick(&mut self, now: u64) {
        let strategy = self.config.strategy;
        let event = match self.drag.as_mut() {
            Some(drag) if drag.preview_due.is_some_and(|due| now >= due) => {
                drag.preview_due = None;
                let shown = drag.candidate.as_ref().unwrap_or(&drag.snapshot);
                TreeEvent::DragPreview {
                    blocks: shown.ordered_blocks(strategy),
                    zone: drag.last_zone.clone().unwrap_or_default(),
                }
            }
            _ => return,
        };
        self.emitter.emit(&event);
    }

    /// Commit the drag.
    ///
    /// Any pending preview is dropped. If a candidate was cached it becomes
    /// the committed state, history records it, and `BlocksChange` is
    /// emitted; if the pointer never produced a valid zone the commit is a
    /// no-op. `DragEnd { cancelled: false }` always follows. Returns `false`
    /// when idle.
    pub fn end_drag(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        if let Some(candidate) = drag.candidate {
            self.committed = candidate;
            self.commit_to_history();
            let event = TreeEvent::BlocksChange {
                blocks: self.blocks(),
            };
            self.emitter.emit(&event);
        }
        self.emitter.emit(&TreeEvent::DragEnd { cancelled: false });
        true
    }

    /// Abort the drag, discarding the candidate.
    ///
    /// The committed blocks were never touched, so there is nothing to
    /// restore. Emits `DragEnd { cancelled: true }`. Returns `false` when
    /// idle.
    pub fn cancel_drag(&mut self) -> bool {
        if self.drag.take().is_none() {
            return false;
        }
        self.emitter.emit(&TreeEvent::DragEnd { cancelled: true });
        true
    }

    /// Insert a block at a drop zone, outside a drag.
    ///
    /// Emits `BlockAdd` then `BlocksChange` and records history. Returns
    /// `false` while dragging.
    ///
    /// # Panics
    ///
    /// Panics if the zone names a block id that does not exist; passing one
    /// is a caller bug, not a data condition.
    pub fn insert_block(&mut self, block: Block, zone: &DropZone) -> bool {
        if self.drag.is_some() {
            return false;
        }
        let id = block.id.clone();
        self.committed = self.committed.insert(block, zone, self.config.strategy);
        self.commit_to_history();
        self.emitter.emit(&TreeEvent::BlockAdd { id });
        let event = TreeEvent::BlocksChange {
            blocks: self.blocks(),
        };
        self.emitter.emit(&event);
        true
    }

    /// Delete a block and its whole subtree, outside a drag.
    ///
    /// Expansion, hover, and selection entries for the removed blocks are
    /// dropped silently. Emits `BlockDelete` then `BlocksChange` and records
    /// history. Returns `false` while dragging or for an unknown id.
    pub fn remove_block(&mut self, id: &BlockId) -> bool {
        if self.drag.is_some() || !self.committed.contains(id) {
            return false;
        }
        let removed = self.committed.descendants(id);
        self.committed = self.committed.remove_subtree(id);
        for gone in &removed {
            self.expanded.remove(gone);
        }
        if self.hover.as_ref().is_some_and(|h| removed.contains(h)) {
            self.hover = None;
        }
        self.selection.retain(|kept| !removed.contains(kept));
        self.commit_to_history();
        self.emitter.emit(&TreeEvent::BlockDelete { id: id.clone() });
        let event = TreeEvent::BlocksChange {
            blocks: self.blocks(),
        };
        self.emitter.emit(&event);
        true
    }

    /// Step history back. Returns `false` while dragging, with history
    /// disabled, or at the oldest state. Emits `BlocksChange` on success.
    pub fn undo(&mut self) -> bool {
        if self.drag.is_some() {
            return false;
        }
        let Some(history) = self.history.as_mut() else {
            return false;
        };
        if !history.undo() {
            return false;
        }
        self.restore_from_history();
        true
    }

    /// Step history forward; the mirror of [`undo`](Self::undo).
    pub fn redo(&mut self) -> bool {
        if self.drag.is_some() {
            return false;
        }
        let Some(history) = self.history.as_mut() else {
            return false;
        };
        if !history.redo() {
            return false;
        }
        self.restore_from_history();
        true
    }

    /// Whether a block is currently expanded.
    pub fn is_expanded(&self, id: &BlockId) -> bool {
        self.expanded.contains(id)
    }

    /// Toggle a block's expansion state. Emits `ExpandChange`; returns
    /// `false` (no event) for unknown ids or when the state did not change.
    pub fn set_expanded(&mut self, id: &BlockId, expanded: bool) -> bool {
        if !self.committed.contains(id) {
            return false;
        }
        let changed = if expanded {
            self.expanded.insert(id.clone())
        } else {
            self.expanded.remove(id)
        };
        if changed {
            self.emitter.emit(&TreeEvent::ExpandChange {
                id: id.clone(),
                expanded,
            });
        }
        changed
    }

    /// The hovered block, if any.
    pub fn hover(&self) -> Option<&BlockId> {
        self.hover.as_ref()
    }

    /// Set the hovered block. Deduplicated: setting the current value emits
    /// nothing and returns `false`.
    pub fn set_hover(&mut self, hover: Option<BlockId>) -> bool {
        if self.hover == hover {
            return false;
        }
        self.hover = hover.clone();
        self.emitter.emit(&TreeEvent::HoverChange { hover });
        true
    }

    /// The current selection.
    pub fn selection(&self) -> &[BlockId] {
        &self.selection
    }

    /// Replace the selection. Unknown ids are dropped; an unchanged
    /// selection emits nothing and returns `false`.
    pub fn set_selection(&mut self, selection: Vec<BlockId>) -> bool {
        let mut next = selection;
        next.retain(|id| self.committed.contains(id));
        if self.selection == next {
            return false;
        }
        self.selection = next.clone();
        self.emitter
            .emit(&TreeEvent::SelectionChange { selection: next });
        true
    }

    fn commit_to_history(&mut self) {
        let blocks = self.committed.ordered_blocks(self.config.strategy);
        if let Some(history) = self.history.as_mut() {
            history.set(blocks);
        }
    }

    fn restore_from_history(&mut self) {
        let present = self
            .history
            .as_ref()
            .map(|h| h.present().to_vec())
            .unwrap_or_default();
        self.committed = BlockIndex::from_blocks(&present);
        self.emitter.emit(&TreeEvent::BlocksChange { blocks: present });
    }
}
