//! Per-frame inputs relayed by the host.

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Viewport};

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Inputs {
    /// Current scroll position and size; omitted when unchanged or unknown.
    #[serde(default)]
    pub viewport: Option<Viewport>,
    /// Layout changes for registered elements.
    #[serde(default)]
    pub rects: Vec<RectUpdate>,
    /// Reduced-motion media query change notification.
    #[serde(default)]
    pub reduced_motion: Option<bool>,
}

impl Inputs {
    pub fn viewport(viewport: Viewport) -> Self {
        Self {
            viewport: Some(viewport),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RectUpdate {
    pub element: String,
    pub rect: Rect,
}
