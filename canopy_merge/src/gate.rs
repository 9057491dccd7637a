// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Latest-only deferral of remote updates.

use alloc::vec::Vec;
use canopy_blocks::Block;

use crate::{MergeOptions, merge_block_versions};

/// How [`SyncGate::exit_busy`] resolves a parked remote payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// Last writer wins: the parked payload is discarded and the caller's
    /// local blocks stand.
    Lww,
    /// Run the merge engine over the parked payload.
    Merge,
}

/// Busy/park/resolve gate for realtime sessions.
///
/// While a blocking local action is in progress (a drag, an open text edit),
/// applying a remote update directly would yank state out from under the
/// user. The gate parks such updates instead, and keeps only the most recent
/// one: intermediate payloads are replaced, never accumulated, so resolution
/// cost does not grow with the length of the local action.
///
/// The protocol is `enter_busy` / any number of `apply` calls / `exit_busy`,
/// which resolves exactly once and returns the gate to the idle state.
///
/// ```rust
/// use canopy_blocks::Block;
/// use canopy_merge::{ResolveStrategy, SyncGate};
///
/// let mut gate = SyncGate::default();
/// gate.enter_busy();
/// assert!(gate.apply(vec![Block::new("1", "paragraph")]).is_none());
/// let local = vec![Block::new("1", "paragraph").with_attr("title", "mine")];
/// // Lww keeps the local blocks; `None` means "nothing to adopt".
/// assert!(gate.exit_busy(&local, ResolveStrategy::Lww).is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SyncGate {
    busy: bool,
    parked: Option<Vec<Block>>,
    options: MergeOptions,
}

impl SyncGate {
    /// A gate resolving with the given merge options.
    pub fn with_options(options: MergeOptions) -> Self {
        Self {
            busy: false,
            parked: None,
            options,
        }
    }

    /// Whether a blocking local action is in progress.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Mark the start of a blocking local action. Idempotent.
    pub fn enter_busy(&mut self) {
        self.busy = true;
    }

    /// Offer a remote payload.
    ///
    /// When idle the payload is handed straight back for immediate
    /// application. When busy it is parked, replacing any earlier parked
    /// payload, and `None` signals "suppressed for now".
    #[must_use]
    pub fn apply(&mut self, remote: Vec<Block>) -> Option<Vec<Block>> {
        if self.busy {
            self.parked = Some(remote);
            None
        } else {
            Some(remote)
        }
    }

    /// End the blocking action and resolve the parked payload, if any.
    ///
    /// Resolves exactly once: the parked payload is consumed and the gate
    /// returns to idle. `None` means the caller's local blocks stand, either
    /// because nothing was parked or because [`ResolveStrategy::Lww`]
    /// discarded the payload; `Some` carries the blocks to adopt.
    #[must_use]
    pub fn exit_busy(&mut self, local: &[Block], strategy: ResolveStrategy) -> Option<Vec<Block>> {
        self.busy = false;
        let parked = self.parked.take()?;
        match strategy {
            ResolveStrategy::Lww => None,
            ResolveStrategy::Merge => Some(merge_block_versions(local, &parked, &self.options)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use canopy_order::FracKey;

    #[test]
    fn idle_gate_passes_updates_through() {
        let mut gate = SyncGate::default();
        let remote = vec![Block::new("1", "paragraph")];
        assert_eq!(gate.apply(remote.clone()), Some(remote));
    }

    #[test]
    fn busy_gate_parks_only_the_latest() {
        let mut gate = SyncGate::default();
        gate.enter_busy();
        assert!(gate.apply(vec![Block::new("1", "paragraph")]).is_none());
        assert!(
            gate.apply(vec![Block::new("1", "paragraph").with_attr("title", "v2")])
                .is_none()
        );

        let local = vec![Block::new("1", "paragraph").with_attr("title", "Local")];
        let merged = gate.exit_busy(&local, ResolveStrategy::Merge).unwrap();
        // Only the latest payload was kept; the v1 payload is gone, and the
        // merge ran against v2 (content still local-preferred).
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].attrs["title"], "Local");
    }

    #[test]
    fn lww_discards_the_parked_payload() {
        let mut gate = SyncGate::default();
        gate.enter_busy();
        let _ = gate.apply(vec![Block::new("1", "paragraph").with_attr("title", "Remote")]);
        let local = vec![Block::new("1", "paragraph").with_attr("title", "Local")];
        assert!(gate.exit_busy(&local, ResolveStrategy::Lww).is_none());
        // The payload was consumed, not left behind for a later exit.
        assert!(gate.exit_busy(&local, ResolveStrategy::Merge).is_none());
    }

    #[test]
    fn exit_with_nothing_parked_is_none() {
        let mut gate = SyncGate::default();
        gate.enter_busy();
        assert!(gate.exit_busy(&[], ResolveStrategy::Merge).is_none());
        assert!(!gate.is_busy());
    }

    #[test]
    fn merge_resolution_applies_structural_remote_fields() {
        let mut gate = SyncGate::default();
        gate.enter_busy();
        let _ = gate.apply(vec![
            Block::new("1", "paragraph")
                .with_order(FracKey::new("a0"))
                .with_attr("title", "Remote"),
        ]);
        let local = vec![Block::new("1", "paragraph").with_attr("title", "Local")];
        let merged = gate.exit_busy(&local, ResolveStrategy::Merge).unwrap();
        assert_eq!(merged[0].order.fractional().unwrap().as_str(), "a0");
        assert_eq!(merged[0].attrs["title"], "Local");
    }
}
