//! Reveal targets: options, per-target state machine and sibling groups.
//!
//! ```text
//! Registered -> Hidden -> Animating -> Visible
//! Hidden | Animating -> Visible          (safety net, reduced motion)
//! ```
//! `Visible` is absorbing: every later transition request is a no-op.

use serde::{Deserialize, Serialize};

use crate::error::{check_fraction, check_time, Result};
use crate::geometry::{Rect, RootMargin};
use crate::ids::{GroupId, TargetId, TweenId};
use crate::interp::Ease;
use crate::style::{Offset, VisualState};
use crate::watcher::WatchOptions;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealOptions {
    /// Seconds before the first sibling starts.
    pub delay: f32,
    /// Extra seconds per sibling index.
    pub stagger: f32,
    pub offset: Offset,
    pub duration: f32,
    pub ease: Ease,
    pub threshold: f32,
    /// Viewport fraction the element must pass before it triggers.
    pub start: f32,
    pub root_margin: RootMargin,
    /// Overrides the configured safety-net window (seconds).
    pub safety_net: Option<f32>,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            delay: 0.0,
            stagger: 0.1,
            offset: Offset::default(),
            duration: 0.6,
            ease: Ease::OutCubic,
            threshold: 0.0,
            start: 0.85,
            root_margin: RootMargin::default(),
            safety_net: None,
        }
    }
}

impl RevealOptions {
    pub fn validate(&self) -> Result<()> {
        check_time("delay", self.delay)?;
        check_time("stagger", self.stagger)?;
        check_time("duration", self.duration)?;
        check_fraction("threshold", self.threshold)?;
        check_fraction("start", self.start)?;
        if let Some(window) = self.safety_net {
            check_time("safety_net", window)?;
        }
        Ok(())
    }

    /// Start delay of the sibling at `index`.
    #[inline]
    pub fn delay_for(&self, index: usize) -> f32 {
        self.delay + index as f32 * self.stagger
    }

    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            threshold: self.threshold,
            root_margin: self.root_margin,
            start_line: Some(self.start),
            once: true,
        }
    }
}

/// What moved a target into its final state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealedBy {
    /// Motion disabled or non-interactive host: never hidden.
    Immediate,
    Animation,
    SafetyNet,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RevealPhase {
    Registered,
    Hidden,
    Animating { tween: TweenId },
    Visible { via: RevealedBy },
}

#[derive(Clone, Debug)]
pub struct RevealTarget {
    pub id: TargetId,
    pub group: GroupId,
    pub element: String,
    pub rect: Rect,
    /// Position within the group; drives the stagger delay.
    pub index: usize,
    offset: Offset,
    state: VisualState,
    phase: RevealPhase,
}

impl RevealTarget {
    pub fn new(
        id: TargetId,
        group: GroupId,
        element: String,
        rect: Rect,
        index: usize,
        offset: Offset,
    ) -> Self {
        Self {
            id,
            group,
            element,
            rect,
            index,
            offset,
            state: VisualState::RESTING,
            phase: RevealPhase::Registered,
        }
    }

    #[inline]
    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    #[inline]
    pub fn state(&self) -> VisualState {
        self.state
    }

    pub fn is_final(&self) -> bool {
        matches!(self.phase, RevealPhase::Visible { .. })
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self.phase, RevealPhase::Hidden)
    }

    pub fn tween(&self) -> Option<TweenId> {
        match self.phase {
            RevealPhase::Animating { tween } => Some(tween),
            _ => None,
        }
    }

    /// Registered -> Hidden. Returns the style to publish, or None if the target is past that point.
    pub fn hide(&mut self) -> Option<VisualState> {
        if self.phase != RevealPhase::Registered {
            return None;
        }
        self.state = VisualState::hidden(self.offset);
        self.phase = RevealPhase::Hidden;
        Some(self.state)
    }

    /// Hidden -> Animating.
    pub fn begin(&mut self, tween: TweenId) -> bool {
        if self.phase != RevealPhase::Hidden {
            return false;
        }
        self.phase = RevealPhase::Animating { tween };
        true
    }

    /// Apply eased progress while animating. Ignored in any other phase.
    pub fn apply_progress(&mut self, progress: f32) -> Option<VisualState> {
        if !matches!(self.phase, RevealPhase::Animating { .. }) {
            return None;
        }
        self.state = VisualState::hidden(self.offset).lerp(&VisualState::RESTING, progress);
        Some(self.state)
    }

    /// Move to the resting state. The single-fire guard: returns false if already visible.
    pub fn mark_visible(&mut self, via: RevealedBy) -> bool {
        if self.is_final() {
            return false;
        }
        self.state = VisualState::RESTING;
        self.phase = RevealPhase::Visible { via };
        true
    }
}

/// Ordered siblings sharing one option set and one safety net.
#[derive(Clone, Debug)]
pub struct RevealGroup {
    pub id: GroupId,
    pub targets: Vec<TargetId>,
    pub options: RevealOptions,
    pub triggered: bool,
}
