//! Motion-preference provider.
//!
//! A single writer (the host, relaying the OS reduced-motion media query) and any
//! number of read-only consumers. Subscribers are told about changes only; the
//! current value is always available through [`MotionPreference::animations_enabled`].

use indexmap::IndexMap;
use std::fmt;
use tracing::debug;

/// Host capability that reports the OS-level reduced-motion setting.
/// `None` means the capability is unavailable, which is treated as "animations enabled".
pub trait MotionQuery {
    fn prefers_reduced_motion(&self) -> Option<bool>;
}

/// Fixed answer, handy for tests and non-browser hosts.
impl MotionQuery for Option<bool> {
    fn prefers_reduced_motion(&self) -> Option<bool> {
        *self
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SubscriptionId(pub u32);

type Listener = Box<dyn FnMut(bool)>;

pub struct MotionPreference {
    reduced: bool,
    next_sub: u32,
    listeners: IndexMap<SubscriptionId, Listener>,
}

impl MotionPreference {
    pub fn new(reduced: bool) -> Self {
        Self {
            reduced,
            next_sub: 0,
            listeners: IndexMap::new(),
        }
    }

    /// Query the host once at startup.
    pub fn from_query(query: &dyn MotionQuery) -> Self {
        let reduced = query.prefers_reduced_motion().unwrap_or(false);
        debug!(reduced, "motion preference initialized");
        Self::new(reduced)
    }

    #[inline]
    pub fn animations_enabled(&self) -> bool {
        !self.reduced
    }

    #[inline]
    pub fn prefers_reduced(&self) -> bool {
        self.reduced
    }

    /// Record a change notification. Returns true and notifies subscribers
    /// (with the new "reduced" value) only when the value actually changed.
    pub fn set_reduced(&mut self, reduced: bool) -> bool {
        if self.reduced == reduced {
            return false;
        }
        self.reduced = reduced;
        debug!(reduced, listeners = self.listeners.len(), "motion preference changed");
        for listener in self.listeners.values_mut() {
            listener(reduced);
        }
        true
    }

    pub fn subscribe(&mut self, listener: impl FnMut(bool) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_sub);
        self.next_sub = self.next_sub.wrapping_add(1);
        self.listeners.insert(id, Box::new(listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.shift_remove(&id).is_some()
    }
}

impl Default for MotionPreference {
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for MotionPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionPreference")
            .field("reduced", &self.reduced)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn unsupported_query_enables_animation() {
        let pref = MotionPreference::from_query(&None::<bool>);
        assert!(pref.animations_enabled());
        let pref = MotionPreference::from_query(&Some(true));
        assert!(!pref.animations_enabled());
    }

    #[test]
    fn subscribers_see_changes_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut pref = MotionPreference::default();
        let sink = Rc::clone(&seen);
        let sub = pref.subscribe(move |reduced| sink.borrow_mut().push(reduced));

        assert!(!pref.set_reduced(false));
        assert!(pref.set_reduced(true));
        assert!(pref.set_reduced(false));
        assert_eq!(*seen.borrow(), vec![true, false]);

        assert!(pref.unsubscribe(sub));
        assert!(!pref.unsubscribe(sub));
        pref.set_reduced(true);
        assert_eq!(seen.borrow().len(), 2);
    }
}
