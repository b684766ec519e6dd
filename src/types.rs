//! Core numeric types shared by the timeline and configuration layers.

use serde::{Deserialize, Serialize};

/// Progress values closer than this to a boundary are treated as the boundary.
///
/// Used by timeline playback to decide completion, so floating point drift
/// from summing frame deltas never leaves a run stuck at `0.9999999`.
pub const PROGRESS_EPSILON: f64 = 1e-6;

/// Clamp a value to `[0, 1]`. NaN collapses to 0.
#[inline]
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Snap `value` onto `boundary` when it is within [`PROGRESS_EPSILON`] of it.
///
/// Only the given boundary attracts: a run creeping away from the other end
/// in steps smaller than the epsilon still moves.
#[inline]
pub fn snap_to(value: f64, boundary: f64) -> f64 {
    if (value - boundary).abs() <= PROGRESS_EPSILON {
        boundary
    } else {
        value
    }
}

/// A pair of numbers describing a sub-range, e.g. a timeline's `line` or `scope`.
///
/// `start` may be greater than `end`; the span is then descending.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    /// The full unit range `[0, 1]`.
    pub const UNIT: Span = Span { start: 0.0, end: 1.0 };

    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Signed length (`end - start`).
    #[inline]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Remap `ratio` so that `start` maps to 0 and `end` to 1, clamping outside.
    ///
    /// A zero-length or inverted span behaves as a step at `start`.
    pub fn relative(&self, ratio: f64) -> f64 {
        if ratio <= self.start {
            return 0.0;
        }
        if ratio >= self.end {
            return 1.0;
        }
        clamp01((ratio - self.start) / self.length())
    }

    /// Affine map of a unit value onto this span. Not clamped.
    #[inline]
    pub fn lerp(&self, unit: f64) -> f64 {
        self.start + self.length() * unit
    }

    pub fn is_unit(&self) -> bool {
        self.start == 0.0 && self.end == 1.0
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::UNIT
    }
}

impl From<[f64; 2]> for Span {
    fn from([start, end]: [f64; 2]) -> Self {
        Self { start, end }
    }
}

impl From<Span> for [f64; 2] {
    fn from(span: Span) -> Self {
        [span.start, span.end]
    }
}

impl From<(f64, f64)> for Span {
    fn from((start, end): (f64, f64)) -> Self {
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp01() {
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(0.25), 0.25);
        assert_eq!(clamp01(3.0), 1.0);
        assert_eq!(clamp01(f64::NAN), 0.0);
    }

    #[test]
    fn test_relative_bounds() {
        let line = Span::new(0.2, 0.6);
        for i in -10..=20 {
            let r = i as f64 / 10.0;
            let p = line.relative(r);
            assert!((0.0..=1.0).contains(&p));
            if r <= 0.2 {
                assert_eq!(p, 0.0);
            }
            if r >= 0.6 {
                assert_eq!(p, 1.0);
            }
        }
        assert!((line.relative(0.4) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_span_is_step() {
        let line = Span::new(0.5, 0.5);
        assert_eq!(line.relative(0.49), 0.0);
        assert_eq!(line.relative(0.5), 0.0);
        assert_eq!(line.relative(0.51), 1.0);
    }

    #[test]
    fn test_lerp_descending() {
        let scope = Span::new(1.0, 0.0);
        assert_eq!(scope.lerp(0.0), 1.0);
        assert_eq!(scope.lerp(1.0), 0.0);
        assert!((scope.lerp(0.25) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_snap_to_one_boundary() {
        assert_eq!(snap_to(0.9999999, 1.0), 1.0);
        assert_eq!(snap_to(0.0000001, 0.0), 0.0);
        assert_eq!(snap_to(0.5, 1.0), 0.5);
        // The far boundary does not attract.
        assert_eq!(snap_to(0.0000001, 1.0), 0.0000001);
        assert_eq!(snap_to(0.9999999, 0.0), 0.9999999);
    }

    #[test]
    fn test_span_serde_as_pair() {
        let span: Span = serde_json::from_str("[0.1, 0.9]").unwrap();
        assert_eq!(span, Span::new(0.1, 0.9));
        assert_eq!(serde_json::to_string(&span).unwrap(), "[0.1,0.9]");
    }
}
