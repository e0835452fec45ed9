//! Scalar interpolation and easing primitives.

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// `powerN.in`: `t^(N+1)`.
#[inline]
pub fn power_in(t: f32, power: u8) -> f32 {
    t.powi(i32::from(power) + 1)
}

/// `powerN.out`: mirror of `power_in`.
#[inline]
pub fn power_out(t: f32, power: u8) -> f32 {
    1.0 - (1.0 - t).powi(i32::from(power) + 1)
}

#[inline]
pub fn power_in_out(t: f32, power: u8) -> f32 {
    let exp = i32::from(power) + 1;
    if t < 0.5 {
        0.5 * (2.0 * t).powi(exp)
    } else {
        1.0 - 0.5 * (2.0 - 2.0 * t).powi(exp)
    }
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Given control points (x1, y1, x2, y2) and an input t in [0,1],
/// compute the eased y by inverting the x bezier via binary search.
#[inline]
pub fn bezier_ease_t(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    // Bezier(0,0,1,1) is exactly linear
    if x1 == 0.0 && y1 == 0.0 && x2 == 1.0 && y2 == 1.0 {
        return t;
    }
    // Monotonic X in [0,1] assumed for x1/x2 in [0,1]
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = t;
    for _ in 0..24 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_bezier_is_identity() {
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert_eq!(bezier_ease_t(t, 0.0, 0.0, 1.0, 1.0), t);
        }
    }

    #[test]
    fn ease_bezier_matches_css_midpoint() {
        // CSS `ease` at x = 0.5 is ~0.8024
        let y = bezier_ease_t(0.5, 0.25, 0.1, 0.25, 1.0);
        assert!((y - 0.8024).abs() < 1e-3, "y={y}");
    }

    #[test]
    fn power_out_is_monotonic() {
        let mut last = 0.0;
        for i in 0..=100 {
            let v = power_out(i as f32 / 100.0, 2);
            assert!(v >= last);
            last = v;
        }
    }
}
