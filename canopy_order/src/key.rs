// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fractional order keys.
//!
//! A [`FracKey`] is a short base-36 digit string that names a point strictly
//! inside the open interval `(0, 1)`. Keys are compared by plain lexicographic
//! byte order, and [`key_between`] can always produce a key strictly between
//! any two existing keys, so a sibling list ordered by fractional keys never
//! needs a global reindex: insertion and reordering touch only the moved
//! entries.
//!
//! Keys are non-empty strings over the digit alphabet `0-9a-z`. The
//! generators in this module additionally never emit a key ending with the
//! digit `0`: a key `x0` admits no key between `x` and itself, which would
//! break unbounded subdivision of that particular gap. Keys that arrive from
//! outside (deserialization, remote peers) may carry trailing zeros and are
//! accepted as opaque lexicographic values; only the alphabet is checked, in
//! debug builds.

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

/// The digit alphabet, in ascending order.
const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A fractional order key.
///
/// Ordering is inherited from the inner string, i.e. plain lexicographic byte
/// comparison. Key length carries no meaning beyond how often a gap has been
/// subdivided.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FracKey(String);

impl FracKey {
    /// Wrap an existing key string.
    ///
    /// The string must be non-empty and use the digits `0-9a-z`; this is
    /// checked with debug assertions only, release builds trust the caller.
    /// Trailing zero digits are accepted (remote peers may produce them); the
    /// key is treated as an opaque lexicographic value either way.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        debug_assert!(!key.is_empty(), "fractional keys are non-empty");
        debug_assert!(
            key.bytes().all(|b| DIGITS.contains(&b)),
            "fractional keys use digits 0-9a-z"
        );
        Self(key)
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FracKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl fmt::Display for FracKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Total order over fractional keys, consistent with generation.
///
/// This is plain lexicographic byte comparison; it never consults key length.
pub fn compare_keys(a: &FracKey, b: &FracKey) -> Ordering {
    a.0.as_str().cmp(b.0.as_str())
}

fn digit_index(d: u8) -> usize {
    DIGITS
        .iter()
        .position(|&c| c == d)
        .expect("key digit is in the 0-9a-z alphabet")
}

/// Midpoint of the open interval `(a, b)` as a digit string.
///
/// `a` may be empty (no lower bound); `b` of `None` means no upper bound.
/// Requires `a < b` and that neither bound ends with the zero digit.
fn midpoint(a: &str, b: Option<&str>) -> String {
    if let Some(b) = b {
        debug_assert!(a < b, "midpoint bounds must be ordered");
        // Carry the shared prefix over verbatim and recurse on the tails.
        // `a` is treated as padded with zero digits, so after stripping, the
        // first digit of the remaining `b` is never `0` and the leading digit
        // gap is at least one.
        let ab = a.as_bytes();
        let bb = b.as_bytes();
        let mut n = 0;
        while n < bb.len() && ab.get(n).copied().unwrap_or(b'0') == bb[n] {
            n += 1;
        }
        if n > 0 {
            let a_rest = if n <= a.len() { &a[n..] } else { "" };
            let mut out = String::from(&b[..n]);
            out.push_str(&midpoint(a_rest, Some(&b[n..])));
            return out;
        }
    }

    let digit_a = a.bytes().next().map(digit_index).unwrap_or(0);
    let digit_b = b.map_or(DIGITS.len(), |b| {
        digit_index(b.as_bytes()[0])
    });
    if digit_b - digit_a > 1 {
        // Room at this position: pick the rounded middle digit.
        let mid = (digit_a + digit_b + 1) / 2;
        let mut out = String::new();
        out.push(DIGITS[mid] as char);
        out
    } else if let Some(b) = b.filter(|b| b.len() > 1) {
        // Consecutive leading digits and `b` has more digits: truncating `b`
        // yields a key strictly below it and strictly above `a`.
        String::from(&b[..1])
    } else {
        // Consecutive leading digits, `b` exhausted at this position: keep
        // `a`'s digit and recurse into the open tail.
        let a_rest = if a.is_empty() { "" } else { &a[1..] };
        let mut out = String::new();
        out.push(DIGITS[digit_a] as char);
        out.push_str(&midpoint(a_rest, None));
        out
    }
}

/// Generate a key strictly between `low` and `high`.
///
/// `None` means "no bound" on that side. For every valid pair of bounds the
/// result satisfies `low < result < high` under lexicographic comparison, and
/// the gap between any two adjacent keys can be subdivided indefinitely.
///
/// ```rust
/// use canopy_order::{FracKey, key_between};
///
/// let a = FracKey::new("a");
/// let b = FracKey::new("b");
/// let mid = key_between(Some(&a), Some(&b));
/// assert!(a < mid && mid < b);
/// ```
pub fn key_between(low: Option<&FracKey>, high: Option<&FracKey>) -> FracKey {
    let a = low.map_or("", FracKey::as_str);
    let b = high.map(FracKey::as_str);
    FracKey(midpoint(a, b))
}

/// Generate `n` ascending keys strictly between `low` and `high`.
///
/// The keys are produced by balanced bisection, which spaces them more evenly
/// (and keeps them shorter) than `n` sequential [`key_between`] calls against
/// the same lower bound.
pub fn n_keys_between(low: Option<&FracKey>, high: Option<&FracKey>, n: usize) -> Vec<FracKey> {
    match n {
        0 => Vec::new(),
        1 => {
            let mut keys = Vec::with_capacity(1);
            keys.push(key_between(low, high));
            keys
        }
        _ => {
            let split = n / 2;
            let mid = key_between(low, high);
            let mut keys = n_keys_between(low, Some(&mid), split);
            let right = n_keys_between(Some(&mid), high, n - split - 1);
            keys.push(mid);
            keys.extend(right);
            keys
        }
    }
}

/// Seed `n` evenly spaced keys for a fresh sibling list.
pub fn initial_keys(n: usize) -> Vec<FracKey> {
    n_keys_between(None, None, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn between_two_keys_is_strictly_inside() {
        let pairs = [
            ("a", "b"),
            ("a", "a1"),
            ("1", "2"),
            ("05", "06"),
            ("z", "zz"),
            ("a1", "a2"),
            ("abc", "abd"),
        ];
        for (lo, hi) in pairs {
            let lo = FracKey::new(lo);
            let hi = FracKey::new(hi);
            let mid = key_between(Some(&lo), Some(&hi));
            assert!(lo < mid && mid < hi, "{lo} < {mid} < {hi} should hold");
        }
    }

    #[test]
    fn open_bounds() {
        let k = key_between(None, None);
        let below = key_between(None, Some(&k));
        let above = key_between(Some(&k), None);
        assert!(below < k, "{below} should sort before {k}");
        assert!(k < above, "{k} should sort before {above}");
    }

    #[test]
    fn repeated_subdivision_never_repeats() {
        // Subdivide the same gap from both sides; every generated key must be
        // fresh and stay inside the shrinking interval.
        let mut lo = FracKey::new("a");
        let hi = FracKey::new("b");
        let mut seen = vec![lo.clone(), hi.clone()];
        for _ in 0..64 {
            let mid = key_between(Some(&lo), Some(&hi));
            assert!(lo < mid && mid < hi, "{lo} < {mid} < {hi} should hold");
            assert!(!seen.contains(&mid), "{mid} was generated twice");
            seen.push(mid.clone());
            lo = mid;
        }

        let lo = FracKey::new("a");
        let mut hi = FracKey::new("b");
        let mut seen = vec![lo.clone(), hi.clone()];
        for _ in 0..64 {
            let mid = key_between(Some(&lo), Some(&hi));
            assert!(lo < mid && mid < hi, "{lo} < {mid} < {hi} should hold");
            assert!(!seen.contains(&mid), "{mid} was generated twice");
            seen.push(mid.clone());
            hi = mid;
        }
    }

    #[test]
    fn external_trailing_zero_keys_are_opaque_values() {
        // Remote peers may hand over keys like "a0"; they must wrap, compare,
        // and bound generation without tripping anything.
        let a = FracKey::new("a");
        let a0 = FracKey::new("a0");
        let a1 = FracKey::new("a1");
        assert!(a < a0 && a0 < a1, "a < a0 < a1 should hold");

        let mid = key_between(Some(&a0), Some(&a1));
        assert!(a0 < mid && mid < a1, "{a0} < {mid} < {a1} should hold");
        let above = key_between(Some(&a0), None);
        assert!(a0 < above, "{a0} should sort before {above}");
    }

    #[test]
    fn prepending_forever_stays_bounded() {
        // Walking toward the lower bound must always find room.
        let mut hi = key_between(None, None);
        for _ in 0..64 {
            let k = key_between(None, Some(&hi));
            assert!(k < hi, "{k} should sort before {hi}");
            hi = k;
        }
    }

    #[test]
    fn appending_forever_stays_bounded() {
        let mut lo = key_between(None, None);
        for _ in 0..64 {
            let k = key_between(Some(&lo), None);
            assert!(lo < k, "{lo} should sort before {k}");
            lo = k;
        }
    }

    #[test]
    fn generated_keys_never_end_in_zero() {
        let mut lo = key_between(None, None);
        let mut hi = key_between(Some(&lo), None);
        for _ in 0..48 {
            let mid = key_between(Some(&lo), Some(&hi));
            assert!(!mid.as_str().ends_with('0'), "{mid} has a trailing zero");
            lo = key_between(None, Some(&mid));
            hi = mid;
            assert!(!lo.as_str().ends_with('0'), "{lo} has a trailing zero");
        }
    }

    #[test]
    fn n_keys_are_strictly_ascending() {
        let keys = n_keys_between(None, None, 5);
        assert_eq!(keys.len(), 5, "expected five keys");
        for pair in keys.windows(2) {
            assert_eq!(
                compare_keys(&pair[0], &pair[1]),
                Ordering::Less,
                "{} should sort before {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn n_keys_respect_bounds() {
        let lo = FracKey::new("c");
        let hi = FracKey::new("d");
        let keys = n_keys_between(Some(&lo), Some(&hi), 7);
        assert_eq!(keys.len(), 7, "expected seven keys");
        for k in &keys {
            assert!(lo < *k && *k < hi, "{lo} < {k} < {hi} should hold");
        }
    }

    #[test]
    fn initial_keys_counts_and_order() {
        assert!(initial_keys(0).is_empty());
        assert_eq!(initial_keys(1).len(), 1, "one seed key");
        let keys = initial_keys(12);
        assert_eq!(keys.len(), 12, "twelve seed keys");
        for pair in keys.windows(2) {
            assert!(pair[0] < pair[1], "seed keys must ascend");
        }
    }

    #[test]
    fn comparison_is_lexicographic_not_length() {
        // "b" is shorter than "a1" but sorts after it.
        let a1 = FracKey::new("a1");
        let b = FracKey::new("b");
        assert_eq!(compare_keys(&a1, &b), Ordering::Less, "a1 < b");
        // A longer key extending a shorter one sorts after it.
        let a = FracKey::new("a");
        let a01 = FracKey::new("a01");
        assert_eq!(compare_keys(&a, &a01), Ordering::Less, "a < a01");
    }
}
