//! Unveil Core (host-agnostic)
//!
//! Scroll-triggered reveal orchestration: one-shot fade/slide reveals with
//! staggered sibling groups, count-up counters, scroll-linked parallax, a
//! reduced-motion switch and per-registration safety nets that guarantee no
//! content stays hidden. The host relays viewport/layout changes through
//! [`Inputs`] and applies the [`Outputs`] returned by [`Engine::update`].

pub mod config;
pub mod counter;
pub mod decl;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod inputs;
pub mod interp;
pub mod motion;
pub mod outputs;
pub mod parallax;
pub mod reveal;
pub mod safety_net;
pub mod style;
pub mod tween;
pub mod watcher;

// Re-exports for consumers (adapters)
pub use config::Config;
pub use counter::{CounterOptions, CounterPhase, CounterState};
pub use decl::{DeclKind, ElementDecl};
pub use engine::Engine;
pub use error::{Result, RevealError};
pub use geometry::{Rect, RootMargin, Viewport};
pub use ids::{CounterId, Disposer, GroupId, ParallaxId, TargetId, TweenId};
pub use inputs::{Inputs, RectUpdate};
pub use interp::Ease;
pub use motion::{MotionPreference, MotionQuery, SubscriptionId};
pub use outputs::{Change, Outputs, Patch, RevealEvent};
pub use parallax::{Direction, ParallaxOptions};
pub use reveal::{RevealOptions, RevealPhase, RevealedBy};
pub use style::{Offset, VisualState};
pub use tween::{Animator, TweenEngine, TweenFrame, TweenSpec};
