//! Output contracts from the engine.
//!
//! Outputs carry the style/text patches for this tick, keyed by element, and a
//! separate list of semantic events. Adapters apply patches to the host and may
//! forward events for analytics or debugging.

use serde::{Deserialize, Serialize};

use crate::ids::{CounterId, Disposer, GroupId, ParallaxId, TargetId};
use crate::reveal::RevealedBy;
use crate::style::VisualState;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Patch {
    /// Opacity, visibility and transform of a reveal target.
    Style(VisualState),
    /// Counter display text.
    Text(String),
    /// Parallax translation in pixels.
    Translate { x: f32, y: f32 },
    /// Remove any engine-applied transform.
    ClearTransform,
}

/// One patch for one element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub element: String,
    pub patch: Patch,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
#[non_exhaustive]
pub enum RevealEvent {
    GroupTriggered {
        group: GroupId,
        at: f32,
    },
    TargetStarted {
        target: TargetId,
        group: GroupId,
        index: usize,
        at: f32,
    },
    TargetRevealed {
        target: TargetId,
        group: GroupId,
        via: RevealedBy,
        at: f32,
    },
    CounterStarted {
        counter: CounterId,
        at: f32,
    },
    CounterFinished {
        counter: CounterId,
        text: String,
        via: RevealedBy,
        at: f32,
    },
    ParallaxAttached {
        parallax: ParallaxId,
    },
    ParallaxDetached {
        parallax: ParallaxId,
    },
    MotionChanged {
        reduced: bool,
    },
}

impl RevealEvent {
    /// Registration this event belongs to. `None` for page-wide events.
    pub fn owner(&self) -> Option<Disposer> {
        match self {
            RevealEvent::GroupTriggered { group, .. }
            | RevealEvent::TargetStarted { group, .. }
            | RevealEvent::TargetRevealed { group, .. } => Some(Disposer::Reveal(*group)),
            RevealEvent::CounterStarted { counter, .. }
            | RevealEvent::CounterFinished { counter, .. } => Some(Disposer::Counter(*counter)),
            RevealEvent::ParallaxAttached { parallax } | RevealEvent::ParallaxDetached { parallax } => {
                Some(Disposer::Parallax(*parallax))
            }
            RevealEvent::MotionChanged { .. } => None,
        }
    }
}

/// Outputs returned by Engine::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<RevealEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, element: &str, patch: Patch) {
        self.changes.push(Change {
            element: element.to_string(),
            patch,
        });
    }

    #[inline]
    pub fn push_event(&mut self, event: RevealEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Drop every pending change addressed to `element`.
    pub fn forget_element(&mut self, element: &str) {
        self.changes.retain(|c| c.element != element);
    }

    /// Drop every pending event raised by `owner`.
    pub fn forget_owner(&mut self, owner: Disposer) {
        self.events.retain(|e| e.owner() != Some(owner));
    }

    /// Changes for one element, in emission order.
    pub fn changes_for<'a>(&'a self, element: &'a str) -> impl Iterator<Item = &'a Patch> + 'a {
        self.changes
            .iter()
            .filter(move |c| c.element == element)
            .map(|c| &c.patch)
    }

    pub fn append(&mut self, other: &mut Outputs) {
        self.changes.append(&mut other.changes);
        self.events.append(&mut other.events);
    }
}
