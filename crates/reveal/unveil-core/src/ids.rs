//! Identifiers and simple allocators for registered entities.

use serde::{Deserialize, Serialize};

/// One element participating in a reveal group.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// A reveal registration (single element or ordered siblings).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CounterId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ParallaxId(pub u32);

/// Handle returned by the tween collaborator.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TweenId(pub u32);

/// Teardown handle for any registration. Every registration id converts into one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Disposer {
    Reveal(GroupId),
    Counter(CounterId),
    Parallax(ParallaxId),
}

impl From<GroupId> for Disposer {
    fn from(id: GroupId) -> Self {
        Disposer::Reveal(id)
    }
}

impl From<CounterId> for Disposer {
    fn from(id: CounterId) -> Self {
        Disposer::Counter(id)
    }
}

impl From<ParallaxId> for Disposer {
    fn from(id: ParallaxId) -> Self {
        Disposer::Parallax(id)
    }
}

/// Monotonic allocator for engine-side ids.
/// Ids are never reused within an engine, so a stale handle can never alias a new registration.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_target: u32,
    next_group: u32,
    next_counter: u32,
    next_parallax: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_target(&mut self) -> TargetId {
        let id = TargetId(self.next_target);
        self.next_target = self.next_target.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_group(&mut self) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group = self.next_group.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_counter(&mut self) -> CounterId {
        let id = CounterId(self.next_counter);
        self.next_counter = self.next_counter.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_parallax(&mut self) -> ParallaxId {
        let id = ParallaxId(self.next_parallax);
        self.next_parallax = self.next_parallax.wrapping_add(1);
        id
    }
}
