//! Easing functions mapping `[0, 1]` onto `[0, 1]`.

use std::f64::consts::PI;
use std::fmt;
use std::rc::Rc;

use crate::types::clamp01;

#[derive(Clone, Default)]
pub enum Easing {
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    SineIn,
    SineOut,
    SineInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    /// CSS `cubic-bezier(x1, y1, x2, y2)`.
    CubicBezier(f64, f64, f64, f64),
    /// Caller-supplied curve. Output is not clamped.
    Custom(Rc<dyn Fn(f64) -> f64>),
}

impl Easing {
    pub fn custom(f: impl Fn(f64) -> f64 + 'static) -> Self {
        Easing::Custom(Rc::new(f))
    }

    /// Look up an easing by name: `linear`, the CSS keywords `ease`,
    /// `ease-in`, `ease-out`, `ease-in-out`, or `ease-{in,out,in-out}-{quad,cubic,quart,sine,expo}`.
    pub fn named(name: &str) -> Option<Self> {
        let easing = match name {
            "linear" => Easing::Linear,
            "ease" => Easing::CubicBezier(0.25, 0.1, 0.25, 1.0),
            "ease-in" => Easing::CubicBezier(0.42, 0.0, 1.0, 1.0),
            "ease-out" => Easing::CubicBezier(0.0, 0.0, 0.58, 1.0),
            "ease-in-out" => Easing::CubicBezier(0.42, 0.0, 0.58, 1.0),
            "ease-in-quad" => Easing::QuadIn,
            "ease-out-quad" => Easing::QuadOut,
            "ease-in-out-quad" => Easing::QuadInOut,
            "ease-in-cubic" => Easing::CubicIn,
            "ease-out-cubic" => Easing::CubicOut,
            "ease-in-out-cubic" => Easing::CubicInOut,
            "ease-in-quart" => Easing::QuartIn,
            "ease-out-quart" => Easing::QuartOut,
            "ease-in-out-quart" => Easing::QuartInOut,
            "ease-in-sine" => Easing::SineIn,
            "ease-out-sine" => Easing::SineOut,
            "ease-in-out-sine" => Easing::SineInOut,
            "ease-in-expo" => Easing::ExpoIn,
            "ease-out-expo" => Easing::ExpoOut,
            "ease-in-out-expo" => Easing::ExpoInOut,
            _ => return None,
        };
        Some(easing)
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, Easing::Linear)
    }

    /// Apply to a progress value. Input is clamped to `[0, 1]`.
    #[inline]
    pub fn apply(&self, t: f64) -> f64 {
        let t = clamp01(t);
        match self {
            Easing::Linear => t,
            Easing::Custom(f) => f(t),
            Easing::QuadIn => power_in(t, 2),
            Easing::QuadOut => power_out(t, 2),
            Easing::QuadInOut => power_in_out(t, 2),
            Easing::CubicIn => power_in(t, 3),
            Easing::CubicOut => power_out(t, 3),
            Easing::CubicInOut => power_in_out(t, 3),
            Easing::QuartIn => power_in(t, 4),
            Easing::QuartOut => power_out(t, 4),
            Easing::QuartInOut => power_in_out(t, 4),
            Easing::SineIn => clamp01(1.0 - (t * PI / 2.0).cos()),
            Easing::SineOut => clamp01((t * PI / 2.0).sin()),
            Easing::SineInOut => clamp01(-((PI * t).cos() - 1.0) / 2.0),
            Easing::ExpoIn => expo_in(t),
            Easing::ExpoOut => expo_out(t),
            Easing::ExpoInOut => expo_in_out(t),
            Easing::CubicBezier(x1, y1, x2, y2) => clamp01(cubic_bezier(t, *x1, *y1, *x2, *y2)),
        }
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => f.write_str("Linear"),
            Easing::QuadIn => f.write_str("QuadIn"),
            Easing::QuadOut => f.write_str("QuadOut"),
            Easing::QuadInOut => f.write_str("QuadInOut"),
            Easing::CubicIn => f.write_str("CubicIn"),
            Easing::CubicOut => f.write_str("CubicOut"),
            Easing::CubicInOut => f.write_str("CubicInOut"),
            Easing::QuartIn => f.write_str("QuartIn"),
            Easing::QuartOut => f.write_str("QuartOut"),
            Easing::QuartInOut => f.write_str("QuartInOut"),
            Easing::SineIn => f.write_str("SineIn"),
            Easing::SineOut => f.write_str("SineOut"),
            Easing::SineInOut => f.write_str("SineInOut"),
            Easing::ExpoIn => f.write_str("ExpoIn"),
            Easing::ExpoOut => f.write_str("ExpoOut"),
            Easing::ExpoInOut => f.write_str("ExpoInOut"),
            Easing::CubicBezier(x1, y1, x2, y2) => f
                .debug_tuple("CubicBezier")
                .field(x1)
                .field(y1)
                .field(x2)
                .field(y2)
                .finish(),
            Easing::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[inline]
fn power_in(t: f64, n: i32) -> f64 {
    t.powi(n)
}

#[inline]
fn power_out(t: f64, n: i32) -> f64 {
    1.0 - (1.0 - t).powi(n)
}

#[inline]
fn power_in_out(t: f64, n: i32) -> f64 {
    if t < 0.5 {
        2f64.powi(n - 1) * t.powi(n)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(n) / 2.0
    }
}

#[inline]
fn expo_in(t: f64) -> f64 {
    if t <= 0.0 { 0.0 } else { 2f64.powf(10.0 * t - 10.0) }
}

#[inline]
fn expo_out(t: f64) -> f64 {
    if t >= 1.0 { 1.0 } else { 1.0 - 2f64.powf(-10.0 * t) }
}

fn expo_in_out(t: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else if t < 0.5 {
        2f64.powf(20.0 * t - 10.0) / 2.0
    } else {
        (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
    }
}

// =============================================================================
// CUBIC BEZIER
// =============================================================================

const NEWTON_ITERATIONS: usize = 8;
const BISECTION_ITERATIONS: usize = 50;
const SOLVE_EPSILON: f64 = 1e-7;

/// Polynomial coefficients of one bezier axis with endpoints 0 and 1.
#[derive(Clone, Copy)]
struct Axis {
    a: f64,
    b: f64,
    c: f64,
}

impl Axis {
    fn new(p1: f64, p2: f64) -> Self {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        Self { a: 1.0 - c - b, b, c }
    }

    #[inline]
    fn sample(&self, s: f64) -> f64 {
        ((self.a * s + self.b) * s + self.c) * s
    }

    #[inline]
    fn slope(&self, s: f64) -> f64 {
        (3.0 * self.a * s + 2.0 * self.b) * s + self.c
    }
}

fn cubic_bezier(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    let x = Axis::new(clamp01(x1), clamp01(x2));
    let y = Axis::new(y1, y2);
    y.sample(solve_param(&x, t))
}

/// Find `s` with `x(s) == t`: Newton first, bisection when the slope is flat.
fn solve_param(x: &Axis, t: f64) -> f64 {
    let mut s = t;
    for _ in 0..NEWTON_ITERATIONS {
        let err = x.sample(s) - t;
        if err.abs() < SOLVE_EPSILON {
            return s;
        }
        let slope = x.slope(s);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= err / slope;
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    s = t;
    for _ in 0..BISECTION_ITERATIONS {
        let value = x.sample(s);
        if (value - t).abs() < SOLVE_EPSILON {
            break;
        }
        if value < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presets() -> Vec<Easing> {
        vec![
            Easing::Linear,
            Easing::QuadIn,
            Easing::QuadOut,
            Easing::QuadInOut,
            Easing::CubicIn,
            Easing::CubicOut,
            Easing::CubicInOut,
            Easing::QuartIn,
            Easing::QuartOut,
            Easing::QuartInOut,
            Easing::SineIn,
            Easing::SineOut,
            Easing::SineInOut,
            Easing::ExpoIn,
            Easing::ExpoOut,
            Easing::ExpoInOut,
            Easing::CubicBezier(0.25, 0.1, 0.25, 1.0),
            Easing::CubicBezier(0.42, 0.0, 0.58, 1.0),
        ]
    }

    #[test]
    fn test_easing_boundaries() {
        for easing in presets() {
            assert!(easing.apply(0.0).abs() < 1e-3, "{easing:?} at t=0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-3, "{easing:?} at t=1");
        }
    }

    #[test]
    fn test_easing_monotonic() {
        for easing in presets() {
            let mut prev = 0.0;
            for i in 0..=20 {
                let t = i as f64 / 20.0;
                let v = easing.apply(t);
                assert!(v >= prev - 1e-9, "{easing:?} not monotonic at t={t}");
                assert!((0.0..=1.0).contains(&v));
                prev = v;
            }
        }
    }

    #[test]
    fn test_in_out_symmetry() {
        for easing in [Easing::QuadInOut, Easing::CubicInOut, Easing::SineInOut, Easing::ExpoInOut] {
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-9, "{easing:?}");
        }
    }

    #[test]
    fn test_linear_bezier_is_identity() {
        let easing = Easing::CubicBezier(0.0, 0.0, 1.0, 1.0);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert!((easing.apply(t) - t).abs() < 1e-5);
        }
    }

    #[test]
    fn test_bezier_known_value() {
        // ease-in-out is symmetric about the midpoint.
        let easing = Easing::named("ease-in-out").unwrap();
        assert!((easing.apply(0.5) - 0.5).abs() < 1e-5);
        assert!(easing.apply(0.25) < 0.25);
        assert!(easing.apply(0.75) > 0.75);
    }

    #[test]
    fn test_input_clamped() {
        assert_eq!(Easing::QuadIn.apply(-1.0), 0.0);
        assert_eq!(Easing::QuadIn.apply(2.0), 1.0);
    }

    #[test]
    fn test_custom_not_clamped() {
        let overshoot = Easing::custom(|t| t * 1.5);
        assert_eq!(overshoot.apply(1.0), 1.5);
        assert_eq!(format!("{overshoot:?}"), "Custom(..)");
    }

    #[test]
    fn test_named() {
        assert!(Easing::named("linear").unwrap().is_linear());
        assert!(matches!(Easing::named("ease-out-expo"), Some(Easing::ExpoOut)));
        assert!(Easing::named("bounce").is_none());
    }
}
