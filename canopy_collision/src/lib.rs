// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drop-target collision strategies.
//!
//! During a drag, an external sensor gathers the drop-zone rectangles the
//! renderer currently shows and asks this crate which zone the pointer means.
//! The crate never touches a display surface: candidates arrive as
//! [`Candidate`] values (zone id plus [`kurbo::Rect`] in whatever coordinate
//! space the sensor chose), the pointer as a rectangle in the same space, and
//! the answer is a zone id with its score.
//!
//! # Strategies
//!
//! - [`WeightedVertical`]: scores by vertical edge distance with a fixed
//!   downward bias, so a pointer resting near the middle of a row resolves
//!   to the "after" zone instead of jittering between "before" and "after".
//! - [`ClosestCenter`]: plain 2D center-to-center distance.
//! - [`Sticky`]: a hysteresis wrapper around any base strategy. Once a zone
//!   wins it stays the answer until a rival beats its current score by more
//!   than a threshold, which stops rapid flapping between near-equal
//!   neighbors. Call [`reset`](CollisionStrategy::reset) when a new drag
//!   starts, or the previous drag's lock leaks into it.
//!
//! Lower scores win throughout.
//!
//! ```rust
//! use canopy_collision::{Candidate, ClosestCenter, CollisionStrategy, Sticky};
//! use kurbo::Rect;
//!
//! let zones = [
//!     Candidate::new("before-a", Rect::new(0.0, 0.0, 100.0, 10.0)),
//!     Candidate::new("after-a", Rect::new(0.0, 10.0, 100.0, 20.0)),
//! ];
//! let mut strategy = Sticky::new(4.0, ClosestCenter);
//! let pointer = Rect::new(48.0, 4.0, 52.0, 8.0);
//! let hit = strategy.pick(&zones, pointer).unwrap();
//! assert_eq!(hit.zone, "before-a");
//! ```

#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Rect;

/// Downward bias applied by [`WeightedVertical`], in the caller's units
/// (typically pixels).
pub const DEFAULT_DOWNWARD_BIAS: f64 = 5.0;

/// A drop zone offered to collision detection: the zone id the renderer
/// attached to the target, and its rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Zone id, e.g. `"after-b7"`.
    pub zone: String,
    /// Zone rectangle, in the same space as the pointer rectangle.
    pub rect: Rect,
}

impl Candidate {
    /// Create a candidate.
    pub fn new(zone: impl Into<String>, rect: Rect) -> Self {
        Self {
            zone: zone.into(),
            rect,
        }
    }
}

/// A scored zone. Lower `value` is better.
#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    /// The winning zone id.
    pub zone: String,
    /// The strategy's score for it.
    pub value: f64,
}

/// Rank candidates by vertical edge distance with a downward bias.
///
/// Each candidate scores `min(|pointerY - top|, |pointerY - bottom|)` against
/// the pointer rectangle's vertical center; when the pointer sits below the
/// candidate's vertical center, `bias` is subtracted. The result is sorted
/// ascending (best first).
pub fn rank_weighted_vertical(candidates: &[Candidate], pointer: Rect, bias: f64) -> Vec<Hit> {
    let pointer_y = pointer.center().y;
    let mut ranked: Vec<Hit> = candidates
        .iter()
        .map(|c| {
            let edge = (pointer_y - c.rect.y0).abs().min((pointer_y - c.rect.y1).abs());
            let below_center = pointer_y > c.rect.center().y;
            Hit {
                zone: c.zone.clone(),
                value: if below_center { edge - bias } else { edge },
            }
        })
        .collect();
    ranked.sort_by(|a, b| a.value.total_cmp(&b.value));
    ranked
}

/// Rank candidates by Euclidean distance between rectangle centers, sorted
/// ascending (best first).
pub fn rank_closest_center(candidates: &[Candidate], pointer: Rect) -> Vec<Hit> {
    let origin = pointer.center();
    let mut ranked: Vec<Hit> = candidates
        .iter()
        .map(|c| Hit {
            zone: c.zone.clone(),
            value: origin.distance(c.rect.center()),
        })
        .collect();
    ranked.sort_by(|a, b| a.value.total_cmp(&b.value));
    ranked
}

/// A way of resolving a pointer position to one drop zone.
///
/// Strategies take `&mut self` so wrappers like [`Sticky`] can carry state;
/// the pure strategies simply ignore it.
pub trait CollisionStrategy {
    /// All candidates with their scores, best first.
    fn rank(&mut self, candidates: &[Candidate], pointer: Rect) -> Vec<Hit>;

    /// The single winning zone, or `None` when there are no candidates.
    fn pick(&mut self, candidates: &[Candidate], pointer: Rect) -> Option<Hit> {
        self.rank(candidates, pointer).into_iter().next()
    }

    /// Clear any per-drag state. A no-op for stateless strategies.
    fn reset(&mut self) {}
}

/// Vertical edge distance scoring with an "insert after" bias.
#[derive(Clone, Debug)]
pub struct WeightedVertical {
    /// Bias subtracted when the pointer sits below a candidate's center.
    pub bias: f64,
}

impl WeightedVertical {
    /// The strategy with [`DEFAULT_DOWNWARD_BIAS`].
    pub fn new() -> Self {
        Self {
            bias: DEFAULT_DOWNWARD_BIAS,
        }
    }
}

impl Default for WeightedVertical {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionStrategy for WeightedVertical {
    fn rank(&mut self, candidates: &[Candidate], pointer: Rect) -> Vec<Hit> {
        rank_weighted_vertical(candidates, pointer, self.bias)
    }
}

/// Center-to-center distance scoring.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClosestCenter;

impl CollisionStrategy for ClosestCenter {
    fn rank(&mut self, candidates: &[Candidate], pointer: Rect) -> Vec<Hit> {
        rank_closest_center(candidates, pointer)
    }
}

/// Hysteresis wrapper around a base strategy.
///
/// The first winner is locked. On later frames the lock only moves to the
/// frame's winner when the winner's score beats the locked zone's *current*
/// score by strictly more than `threshold`. A locked zone that is no longer
/// among the candidates releases the lock immediately.
#[derive(Clone, Debug)]
pub struct Sticky<S> {
    base: S,
    threshold: f64,
    locked: Option<String>,
}

impl<S: CollisionStrategy> Sticky<S> {
    /// Wrap `base` with a switch threshold in the caller's units.
    pub fn new(threshold: f64, base: S) -> Self {
        Self {
            base,
            threshold,
            locked: None,
        }
    }

    /// The currently locked zone id, if any.
    pub fn locked(&self) -> Option<&str> {
        self.locked.as_deref()
    }
}

impl<S: CollisionStrategy> CollisionStrategy for Sticky<S> {
    fn rank(&mut self, candidates: &[Candidate], pointer: Rect) -> Vec<Hit> {
        self.base.rank(candidates, pointer)
    }

    fn pick(&mut self, candidates: &[Candidate], pointer: Rect) -> Option<Hit> {
        let ranked = self.base.rank(candidates, pointer);
        let winner = ranked.first()?;
        let held = self
            .locked
            .as_ref()
            .and_then(|zone| ranked.iter().find(|hit| hit.zone == *zone));
        let hit = match held {
            Some(held) if held.value - winner.value <= self.threshold => held.clone(),
            _ => winner.clone(),
        };
        self.locked = Some(hit.zone.clone());
        Some(hit)
    }

    fn reset(&mut self) {
        self.locked = None;
        self.base.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn rect(y0: f64, y1: f64) -> Rect {
        Rect::new(0.0, y0, 100.0, y1)
    }

    fn pointer_at(y: f64) -> Rect {
        Rect::new(50.0, y, 50.0, y)
    }

    /// A fixed-score strategy for exercising the sticky rule directly.
    struct Scripted(Vec<Hit>);

    impl CollisionStrategy for Scripted {
        fn rank(&mut self, _: &[Candidate], _: Rect) -> Vec<Hit> {
            let mut ranked = self.0.clone();
            ranked.sort_by(|a, b| a.value.total_cmp(&b.value));
            ranked
        }
    }

    #[test]
    fn weighted_vertical_prefers_nearest_edge() {
        let zones = [
            Candidate::new("before-a", rect(0.0, 20.0)),
            Candidate::new("after-a", rect(20.0, 40.0)),
        ];
        let hit = WeightedVertical::new().pick(&zones, pointer_at(3.0)).unwrap();
        assert_eq!(hit.zone, "before-a");
        let hit = WeightedVertical::new().pick(&zones, pointer_at(38.0)).unwrap();
        assert_eq!(hit.zone, "after-a");
    }

    #[test]
    fn weighted_vertical_biases_downward_at_midpoint() {
        // The pointer sits just below the midpoint of the row: both zones
        // are 9-ish away by edge distance, but only the upper zone (whose
        // center the pointer is below) gets the bias.
        let zones = [
            Candidate::new("before-a", rect(0.0, 20.0)),
            Candidate::new("after-a", rect(20.0, 40.0)),
        ];
        let hit = WeightedVertical::new().pick(&zones, pointer_at(21.0)).unwrap();
        assert_eq!(hit.zone, "before-a", "downward bias favors the zone above");
    }

    #[test]
    fn weighted_vertical_empty_input() {
        assert!(WeightedVertical::new().pick(&[], pointer_at(0.0)).is_none());
    }

    #[test]
    fn closest_center_ranks_by_distance() {
        let zones = [
            Candidate::new("far", Rect::new(200.0, 200.0, 300.0, 300.0)),
            Candidate::new("near", Rect::new(0.0, 0.0, 10.0, 10.0)),
        ];
        let ranked = ClosestCenter.rank(&zones, Rect::new(0.0, 0.0, 2.0, 2.0));
        assert_eq!(ranked[0].zone, "near");
        assert_eq!(ranked[1].zone, "far");
        assert!(ranked[0].value < ranked[1].value);
    }

    #[test]
    fn sticky_keeps_lock_within_threshold() {
        let mut sticky = Sticky::new(20.0, Scripted(vec![
            Hit { zone: "a".into(), value: 10.0 },
            Hit { zone: "b".into(), value: 11.0 },
        ]));
        let hit = sticky.pick(&[], pointer_at(0.0)).unwrap();
        assert_eq!(hit.zone, "a");

        // "b" improves to 5: better by 5, under the threshold, lock holds.
        sticky.base = Scripted(vec![
            Hit { zone: "a".into(), value: 10.0 },
            Hit { zone: "b".into(), value: 5.0 },
        ]);
        let hit = sticky.pick(&[], pointer_at(0.0)).unwrap();
        assert_eq!(hit.zone, "a");

        // "b" improves to -15: better by 25, beyond the threshold, switch.
        sticky.base = Scripted(vec![
            Hit { zone: "a".into(), value: 10.0 },
            Hit { zone: "b".into(), value: -15.0 },
        ]);
        let hit = sticky.pick(&[], pointer_at(0.0)).unwrap();
        assert_eq!(hit.zone, "b");
        assert_eq!(sticky.locked(), Some("b"));
    }

    #[test]
    fn sticky_releases_vanished_lock() {
        let mut sticky = Sticky::new(20.0, Scripted(vec![
            Hit { zone: "a".into(), value: 10.0 },
        ]));
        assert_eq!(sticky.pick(&[], pointer_at(0.0)).unwrap().zone, "a");
        sticky.base = Scripted(vec![Hit { zone: "b".into(), value: 50.0 }]);
        // "a" is gone from the frame; "b" wins regardless of the threshold.
        assert_eq!(sticky.pick(&[], pointer_at(0.0)).unwrap().zone, "b");
    }

    #[test]
    fn sticky_reset_clears_the_lock() {
        let mut sticky = Sticky::new(100.0, Scripted(vec![
            Hit { zone: "a".into(), value: 0.0 },
            Hit { zone: "b".into(), value: 1.0 },
        ]));
        assert_eq!(sticky.pick(&[], pointer_at(0.0)).unwrap().zone, "a");
        sticky.base = Scripted(vec![
            Hit { zone: "a".into(), value: 1.0 },
            Hit { zone: "b".into(), value: 0.0 },
        ]);
        sticky.reset();
        // After reset the frame winner is adopted outright.
        assert_eq!(sticky.pick(&[], pointer_at(0.0)).unwrap().zone, "b");
    }

    #[test]
    fn sticky_over_geometry_end_to_end() {
        let zones = [
            Candidate::new("before-a", rect(0.0, 20.0)),
            Candidate::new("after-a", rect(20.0, 40.0)),
        ];
        let mut sticky = Sticky::new(8.0, WeightedVertical::new());
        assert_eq!(sticky.pick(&zones, pointer_at(2.0)).unwrap().zone, "before-a");
        // Drifting a little past the boundary is absorbed by the lock.
        assert_eq!(sticky.pick(&zones, pointer_at(33.0)).unwrap().zone, "before-a");
        // A decisive move switches.
        assert_eq!(sticky.pick(&zones, pointer_at(39.0)).unwrap().zone, "after-a");
    }
}
