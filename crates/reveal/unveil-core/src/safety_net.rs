//! Safety-net deadlines.
//!
//! One countdown per reveal group or counter, armed at registration. The engine
//! cancels it on success or disposal; whatever is still armed at expiry is handed
//! back so the engine can force the final state.

use indexmap::IndexMap;
use std::hash::Hash;

#[derive(Debug)]
pub struct SafetyNets<K> {
    remaining: IndexMap<K, f32>,
}

impl<K> Default for SafetyNets<K> {
    fn default() -> Self {
        Self {
            remaining: IndexMap::new(),
        }
    }
}

impl<K> SafetyNets<K>
where
    K: Copy + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) a deadline `seconds` from now.
    pub fn arm(&mut self, key: K, seconds: f32) {
        self.remaining.insert(key, seconds.max(0.0));
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        self.remaining.shift_remove(key).is_some()
    }

    pub fn is_armed(&self, key: &K) -> bool {
        self.remaining.contains_key(key)
    }

    pub fn remaining(&self, key: &K) -> Option<f32> {
        self.remaining.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn clear(&mut self) {
        self.remaining.clear();
    }

    /// Count every deadline down by `dt` and return the ones that expired, in arming order.
    /// Expired deadlines are disarmed.
    pub fn advance(&mut self, dt: f32) -> Vec<K> {
        let mut expired = Vec::new();
        self.remaining.retain(|key, left| {
            *left -= dt.max(0.0);
            if *left <= 0.0 {
                expired.push(*key);
                false
            } else {
                true
            }
        });
        expired
    }
}
