//! Visual state written to elements: opacity plus a 2D translate/scale transform.

use serde::{Deserialize, Serialize};

use crate::interp::lerp_f32;

/// Starting displacement of a reveal target relative to its resting position.
/// Fields left out of a serialized offset take their values from `Offset::default()`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Offset {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Default for Offset {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 40.0,
            scale: 1.0,
        }
    }
}

impl Offset {
    pub const NONE: Offset = Offset {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
    };

    pub const fn up(y: f32) -> Self {
        Self { x: 0.0, y, scale: 1.0 }
    }
}

/// Computed style of a reveal target at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisualState {
    pub opacity: f32,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    /// `visibility: hidden` when false. Hidden targets are kept out of the
    /// accessibility tree until their reveal starts.
    pub visible: bool,
}

impl VisualState {
    /// Fully shown, no transform.
    pub const RESTING: VisualState = VisualState {
        opacity: 1.0,
        x: 0.0,
        y: 0.0,
        scale: 1.0,
        visible: true,
    };

    pub fn hidden(offset: Offset) -> Self {
        Self {
            opacity: 0.0,
            x: offset.x,
            y: offset.y,
            scale: offset.scale,
            visible: false,
        }
    }

    /// Interpolate from `self` toward `to`. Any progress past zero makes the element visible.
    pub fn lerp(&self, to: &VisualState, t: f32) -> VisualState {
        VisualState {
            opacity: lerp_f32(self.opacity, to.opacity, t),
            x: lerp_f32(self.x, to.x, t),
            y: lerp_f32(self.y, to.y, t),
            scale: lerp_f32(self.scale, to.scale, t),
            visible: t > 0.0 || self.visible,
        }
    }

    /// True while the element is still effectively invisible.
    pub fn is_concealed(&self) -> bool {
        self.opacity <= 0.0 || !self.visible
    }

    pub fn has_transform(&self) -> bool {
        self.x != 0.0 || self.y != 0.0 || self.scale != 1.0
    }

    /// CSS `transform` value; `none` at rest.
    pub fn transform_css(&self) -> String {
        if !self.has_transform() {
            return "none".to_string();
        }
        let mut out = format!("translate({}px, {}px)", self.x, self.y);
        if self.scale != 1.0 {
            out.push_str(&format!(" scale({})", self.scale));
        }
        out
    }
}

impl Default for VisualState {
    fn default() -> Self {
        Self::RESTING
    }
}
