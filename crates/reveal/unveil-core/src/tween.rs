//! Tween collaborator.
//!
//! The engine never interpolates on its own clock: it asks an [`Animator`] for
//! tweens and consumes the per-frame progress the animator reports. The animator
//! only deals in normalized progress; mapping progress onto styles or counter
//! values is the caller's job. Any engine honoring this contract can replace
//! [`TweenEngine`], e.g. a binding onto a host animation library.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::ids::TweenId;
use crate::interp::Ease;

/// Timing of one tween.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TweenSpec {
    /// Seconds between creation and the first frame.
    pub delay: f32,
    pub duration: f32,
    pub ease: Ease,
}

/// Progress report for one tween on one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TweenFrame {
    pub id: TweenId,
    /// Eased progress in [0, 1]; exactly 1.0 on the completing frame.
    pub progress: f32,
    /// First frame after the delay elapsed.
    pub started: bool,
    /// Final frame; the tween is gone afterwards.
    pub completed: bool,
}

/// Minimal tweening contract: start, cancel, advance.
pub trait Animator: Debug {
    fn animate(&mut self, spec: TweenSpec) -> TweenId;
    /// Returns false when the tween already finished or was never issued.
    fn cancel(&mut self, id: TweenId) -> bool;
    /// Advance every live tween by `dt` seconds, in creation order.
    fn advance(&mut self, dt: f32) -> Vec<TweenFrame>;
    fn is_active(&self, id: TweenId) -> bool;
}

#[derive(Clone, Debug)]
struct Tween {
    spec: TweenSpec,
    elapsed: f32,
    started: bool,
}

/// Default in-process animator.
#[derive(Debug, Default)]
pub struct TweenEngine {
    next_id: u32,
    live: IndexMap<TweenId, Tween>,
}

impl TweenEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

impl Animator for TweenEngine {
    fn animate(&mut self, spec: TweenSpec) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.live.insert(
            id,
            Tween {
                spec,
                elapsed: 0.0,
                started: false,
            },
        );
        id
    }

    fn cancel(&mut self, id: TweenId) -> bool {
        self.live.shift_remove(&id).is_some()
    }

    fn advance(&mut self, dt: f32) -> Vec<TweenFrame> {
        let mut frames = Vec::new();
        self.live.retain(|id, tween| {
            tween.elapsed += dt.max(0.0);
            let local = tween.elapsed - tween.spec.delay;
            if local < 0.0 {
                return true;
            }
            let linear = if tween.spec.duration <= 0.0 {
                1.0
            } else {
                (local / tween.spec.duration).min(1.0)
            };
            let completed = linear >= 1.0;
            let started = !tween.started;
            tween.started = true;
            frames.push(TweenFrame {
                id: *id,
                progress: if completed {
                    1.0
                } else {
                    tween.spec.ease.apply(linear)
                },
                started,
                completed,
            });
            !completed
        });
        frames
    }

    fn is_active(&self, id: TweenId) -> bool {
        self.live.contains_key(&id)
    }
}
