//! Intersection watcher.
//!
//! Registry of element rects keyed by caller-chosen keys. Each evaluation compares
//! every entry against the effective viewport (viewport clipped at the start line,
//! then grown/shrunk by the root margin) and reports threshold crossings in
//! registration order. One-shot entries leave the registry on the evaluation that
//! fires them, so they can never fire twice.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

use crate::geometry::{Rect, RootMargin, Viewport};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatchOptions {
    /// Minimum visible fraction of the element, in [0, 1]. Zero fires on any contact.
    pub threshold: f32,
    #[serde(default)]
    pub root_margin: RootMargin,
    /// Fraction of the viewport height (from the top) that acts as the bottom edge,
    /// e.g. 0.85 fires once the element passes 85% of the way up the screen.
    #[serde(default)]
    pub start_line: Option<f32>,
    pub once: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: RootMargin::default(),
            start_line: None,
            once: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crossing {
    Enter,
    Leave,
}

#[derive(Clone, Debug)]
struct Entry {
    rect: Rect,
    opts: WatchOptions,
    inside: bool,
}

#[derive(Debug)]
pub struct IntersectionWatcher<K> {
    entries: IndexMap<K, Entry>,
}

impl<K> Default for IntersectionWatcher<K> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

/// Viewport area an element is tested against.
pub fn effective_area(viewport: &Viewport, opts: &WatchOptions) -> Rect {
    let mut base = viewport.rect();
    if let Some(line) = opts.start_line {
        base.height *= line.clamp(0.0, 1.0);
    }
    opts.root_margin.apply(base)
}

pub fn satisfies(rect: &Rect, opts: &WatchOptions, viewport: &Viewport) -> bool {
    let area = effective_area(viewport, opts);
    if opts.threshold <= 0.0 {
        if rect.area() <= 0.0 {
            return area.contains_point(rect.x, rect.y);
        }
        return rect.intersection(&area).is_some();
    }
    rect.visible_fraction(&area) >= opts.threshold
}

impl<K> IntersectionWatcher<K>
where
    K: Clone + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing `key`. Returns false (and changes nothing) if it is already observed.
    pub fn observe(&mut self, key: K, rect: Rect, opts: WatchOptions) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(
            key,
            Entry {
                rect,
                opts,
                inside: false,
            },
        );
        true
    }

    pub fn unobserve(&mut self, key: &K) -> bool {
        self.entries.shift_remove(key).is_some()
    }

    pub fn update_rect(&mut self, key: &K, rect: Rect) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.rect = rect;
                true
            }
            None => false,
        }
    }

    pub fn is_observed(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Evaluate a single entry right away, e.g. at registration time so already
    /// visible elements do not wait for the next scroll.
    pub fn check(&mut self, key: &K, viewport: &Viewport) -> Option<Crossing> {
        let entry = self.entries.get_mut(key)?;
        let crossing = Self::step(entry, viewport);
        if crossing == Some(Crossing::Enter) && entry.opts.once {
            self.entries.shift_remove(key);
        }
        crossing
    }

    /// Evaluate every entry against `viewport`, in registration order.
    pub fn evaluate(&mut self, viewport: &Viewport) -> Vec<(K, Crossing)> {
        let mut fired = Vec::new();
        self.entries.retain(|key, entry| match Self::step(entry, viewport) {
            Some(crossing) => {
                fired.push((key.clone(), crossing));
                !(entry.opts.once && crossing == Crossing::Enter)
            }
            None => true,
        });
        fired
    }

    fn step(entry: &mut Entry, viewport: &Viewport) -> Option<Crossing> {
        let now = satisfies(&entry.rect, &entry.opts, viewport);
        match (entry.inside, now) {
            (false, true) => {
                entry.inside = true;
                Some(Crossing::Enter)
            }
            (true, false) => {
                entry.inside = false;
                Some(Crossing::Leave)
            }
            _ => None,
        }
    }
}
