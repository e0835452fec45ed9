//! Layout geometry in document coordinates (pixels, y grows downward).

use serde::{Deserialize, Serialize};

/// Axis-aligned element box in document coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Overlap of two rects, or None when they are disjoint. Touching edges yield a
    /// zero-area overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Fraction of this rect covered by `area`, in [0, 1].
    /// Degenerate (zero-area) rects count as fully covered when their origin lies inside.
    pub fn visible_fraction(&self, area: &Rect) -> f32 {
        let own = self.area();
        if own <= 0.0 {
            return if area.contains_point(self.x, self.y) {
                1.0
            } else {
                0.0
            };
        }
        match self.intersection(area) {
            Some(overlap) => (overlap.area() / own).clamp(0.0, 1.0),
            None => 0.0,
        }
    }
}

/// The scrolled window onto the document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    #[serde(default)]
    pub scroll_x: f32,
    #[serde(default)]
    pub scroll_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width,
            height,
        }
    }

    pub fn scrolled_to(mut self, scroll_y: f32) -> Self {
        self.scroll_y = scroll_y;
        self
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.scroll_x, self.scroll_y, self.width, self.height)
    }
}

/// Grows (positive) or shrinks (negative) the viewport before intersection tests,
/// in the same order as CSS margins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RootMargin {
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub right: f32,
    #[serde(default)]
    pub bottom: f32,
    #[serde(default)]
    pub left: f32,
}

impl RootMargin {
    pub const fn uniform(px: f32) -> Self {
        Self {
            top: px,
            right: px,
            bottom: px,
            left: px,
        }
    }

    pub const fn vertical(px: f32) -> Self {
        Self {
            top: px,
            right: 0.0,
            bottom: px,
            left: 0.0,
        }
    }

    pub fn apply(&self, rect: Rect) -> Rect {
        let x = rect.x - self.left;
        let y = rect.y - self.top;
        let width = (rect.width + self.left + self.right).max(0.0);
        let height = (rect.height + self.top + self.bottom).max(0.0);
        Rect::new(x, y, width, height)
    }
}
