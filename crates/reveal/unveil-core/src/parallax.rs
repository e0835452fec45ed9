//! Scroll-linked parallax bindings.
//!
//! Progress runs 0 -> 1 from "leading edge at the `start` viewport fraction" to
//! "trailing edge at the `end` viewport fraction" and maps linearly onto a
//! translation of `+speed * size` down to `-speed * size` along the chosen axis.
//! Unlike reveals this never completes; it scrubs while the binding is active.

use serde::{Deserialize, Serialize};

use crate::error::{check_fraction, RevealError, Result};
use crate::geometry::{Rect, Viewport};
use crate::ids::ParallaxId;
use crate::interp::lerp_f32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxOptions {
    /// Fraction of the element size travelled to either side of rest.
    pub speed: f32,
    pub direction: Direction,
    /// Viewport fraction the element's top must reach for progress 0.
    pub start: f32,
    /// Viewport fraction the element's bottom must reach for progress 1.
    pub end: f32,
}

impl Default for ParallaxOptions {
    fn default() -> Self {
        Self {
            speed: 0.2,
            direction: Direction::Vertical,
            start: 1.0,
            end: 0.0,
        }
    }
}

impl ParallaxOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.speed.is_finite() {
            return Err(RevealError::InvalidSpeed { value: self.speed });
        }
        check_fraction("start", self.start)?;
        check_fraction("end", self.end)?;
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct ParallaxBinding {
    pub id: ParallaxId,
    pub element: String,
    pub rect: Rect,
    pub options: ParallaxOptions,
    /// Listening for scroll (motion allowed).
    pub attached: bool,
    /// Inside the extended range; offsets are only recomputed while active.
    pub active: bool,
    last: Option<[f32; 2]>,
}

impl ParallaxBinding {
    pub fn new(id: ParallaxId, element: String, rect: Rect, options: ParallaxOptions) -> Self {
        Self {
            id,
            element,
            rect,
            options,
            attached: false,
            active: false,
            last: None,
        }
    }

    /// Scroll progress through the element's range, clamped to [0, 1].
    pub fn progress(&self, viewport: &Viewport) -> f32 {
        let from = self.rect.y - self.options.start * viewport.height;
        let to = self.rect.bottom() - self.options.end * viewport.height;
        let span = to - from;
        if span <= 0.0 {
            return if viewport.scroll_y >= to { 1.0 } else { 0.0 };
        }
        ((viewport.scroll_y - from) / span).clamp(0.0, 1.0)
    }

    /// Translation (x, y) for the given viewport.
    pub fn translation(&self, viewport: &Viewport) -> [f32; 2] {
        let size = match self.options.direction {
            Direction::Vertical => self.rect.height,
            Direction::Horizontal => self.rect.width,
        };
        let amplitude = self.options.speed * size;
        let shift = lerp_f32(amplitude, -amplitude, self.progress(viewport));
        match self.options.direction {
            Direction::Vertical => [0.0, shift],
            Direction::Horizontal => [shift, 0.0],
        }
    }

    /// Recompute and return the translation when it changed since the last sample.
    pub fn sample(&mut self, viewport: &Viewport) -> Option<[f32; 2]> {
        let next = self.translation(viewport);
        if self.last == Some(next) {
            return None;
        }
        self.last = Some(next);
        Some(next)
    }

    pub fn offset(&self) -> Option<[f32; 2]> {
        self.last
    }

    /// Forget the applied transform. Returns true if one was applied.
    pub fn reset(&mut self) -> bool {
        self.active = false;
        self.last.take().is_some()
    }
}
