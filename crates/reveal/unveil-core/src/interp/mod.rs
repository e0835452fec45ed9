//! Easing curves and scalar interpolation helpers.
//!
//! Named curves follow the tweening-library power families, where `PowerOut(2)`
//! is `power2.out` = `1 - (1 - t)^3`. Arbitrary
//! curves are expressed as CSS-style cubic-bezier control points.

pub mod functions;

use serde::{Deserialize, Serialize};

pub use functions::{bezier_ease_t, lerp_f32, lerp_f64};

/// Timing curve applied to normalized tween progress.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    PowerIn(u8),
    PowerOut(u8),
    PowerInOut(u8),
    /// `power2.out` (cubic), the reveal default.
    #[default]
    OutCubic,
    OutExpo,
    /// Control points (x1, y1, x2, y2).
    CubicBezier([f32; 4]),
}

impl Ease {
    /// Map linear progress `t` in [0, 1] to eased progress. Endpoints are exact.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }
        match *self {
            Ease::Linear => t,
            Ease::PowerIn(p) => functions::power_in(t, p),
            Ease::PowerOut(p) => functions::power_out(t, p),
            Ease::PowerInOut(p) => functions::power_in_out(t, p),
            Ease::OutCubic => functions::power_out(t, 2),
            Ease::OutExpo => 1.0 - 2f32.powf(-10.0 * t),
            Ease::CubicBezier([x1, y1, x2, y2]) => bezier_ease_t(t, x1, y1, x2, y2),
        }
    }
}
