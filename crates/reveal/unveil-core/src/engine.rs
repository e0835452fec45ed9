//! Engine: registration API, per-frame orchestration and teardown.
//!
//! Each `update(dt, inputs)` runs, in order:
//! 1. apply host inputs (motion preference, viewport, rect changes)
//! 2. advance tweens and map their progress onto targets/counters
//! 3. evaluate the intersection watcher and trigger newly visible registrations
//! 4. sample active parallax bindings
//! 5. advance safety nets and force whatever they catch to its final state
//!
//! Tweens advance before triggers so a freshly started tween never receives the
//! frame that preceded its trigger.

use hashbrown::HashMap;
use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::counter::{CounterOptions, CounterState};
use crate::decl::{DeclKind, ElementDecl};
use crate::error::{RevealError, Result};
use crate::geometry::{Rect, RootMargin, Viewport};
use crate::ids::{CounterId, Disposer, GroupId, IdAllocator, ParallaxId, TargetId, TweenId};
use crate::inputs::Inputs;
use crate::motion::{MotionPreference, MotionQuery};
use crate::outputs::{Outputs, Patch, RevealEvent};
use crate::parallax::{ParallaxBinding, ParallaxOptions};
use crate::reveal::{RevealGroup, RevealOptions, RevealPhase, RevealTarget, RevealedBy};
use crate::safety_net::SafetyNets;
use crate::style::VisualState;
use crate::tween::{Animator, TweenEngine, TweenFrame, TweenSpec};
use crate::watcher::{Crossing, IntersectionWatcher, WatchOptions};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
enum WatchKey {
    Reveal(TargetId),
    Counter(CounterId),
    Parallax(ParallaxId),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
enum TweenOwner {
    Reveal(TargetId),
    Counter(CounterId),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
enum NetKey {
    Reveal(GroupId),
    Counter(CounterId),
}

#[derive(Debug)]
pub struct Engine {
    cfg: Config,
    ids: IdAllocator,
    motion: MotionPreference,
    animator: Box<dyn Animator>,
    watcher: IntersectionWatcher<WatchKey>,
    nets: SafetyNets<NetKey>,
    viewport: Option<Viewport>,
    clock: f32,

    targets: IndexMap<TargetId, RevealTarget>,
    groups: IndexMap<GroupId, RevealGroup>,
    counters: IndexMap<CounterId, CounterState>,
    parallax: IndexMap<ParallaxId, ParallaxBinding>,
    /// Element key -> owning registration.
    elements: HashMap<String, Disposer>,
    tween_owners: HashMap<TweenId, TweenOwner>,

    /// Changes produced between frames (registration, disposal); flushed by the next update.
    pending: Outputs,
    outputs: Outputs,
}

impl Engine {
    /// Create an engine with the default animator and animations enabled.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            ids: IdAllocator::new(),
            motion: MotionPreference::default(),
            animator: Box::new(TweenEngine::new()),
            watcher: IntersectionWatcher::new(),
            nets: SafetyNets::new(),
            viewport: None,
            clock: 0.0,
            targets: IndexMap::new(),
            groups: IndexMap::new(),
            counters: IndexMap::new(),
            parallax: IndexMap::new(),
            elements: HashMap::new(),
            tween_owners: HashMap::new(),
            pending: Outputs::default(),
            outputs: Outputs::default(),
        }
    }

    /// Initialize the motion preference from the host's media query.
    pub fn with_motion_query(mut self, query: &dyn MotionQuery) -> Self {
        self.motion = MotionPreference::from_query(query);
        self
    }

    /// Replace the tween collaborator. Call before registering anything.
    pub fn with_animator(mut self, animator: Box<dyn Animator>) -> Self {
        self.animator = animator;
        self
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn motion(&self) -> &MotionPreference {
        &self.motion
    }

    /// Subscription access for host components that re-render on preference changes.
    pub fn motion_mut(&mut self) -> &mut MotionPreference {
        &mut self.motion
    }

    /// Seconds of frame time consumed so far.
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    fn animates(&self) -> bool {
        self.cfg.interactive && self.motion.animations_enabled()
    }

    // ---------------------------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------------------------

    fn claim_elements<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Result<()> {
        let mut seen = hashbrown::HashSet::new();
        for key in keys {
            if self.elements.contains_key(key) || !seen.insert(key) {
                return Err(RevealError::DuplicateElement {
                    element: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Register one element for a one-shot reveal.
    pub fn register_reveal(
        &mut self,
        element: impl Into<String>,
        rect: Rect,
        options: RevealOptions,
    ) -> Result<GroupId> {
        self.register_reveal_group([(element.into(), rect)], options)
    }

    /// Register ordered siblings; sibling `i` starts `delay + i * stagger` seconds after the
    /// group triggers. The group triggers when any member satisfies the watcher.
    pub fn register_reveal_group<I, S>(&mut self, members: I, options: RevealOptions) -> Result<GroupId>
    where
        I: IntoIterator<Item = (S, Rect)>,
        S: Into<String>,
    {
        options.validate()?;
        let members: Vec<(String, Rect)> =
            members.into_iter().map(|(s, r)| (s.into(), r)).collect();
        if members.is_empty() {
            return Err(RevealError::EmptyGroup);
        }
        self.claim_elements(members.iter().map(|(s, _)| s.as_str()))?;

        let gid = self.ids.alloc_group();
        let mut ids = Vec::with_capacity(members.len());
        for (index, (element, rect)) in members.into_iter().enumerate() {
            let tid = self.ids.alloc_target();
            self.elements.insert(element.clone(), Disposer::Reveal(gid));
            self.targets.insert(
                tid,
                RevealTarget::new(tid, gid, element, rect, index, options.offset),
            );
            ids.push(tid);
        }
        debug!(group = gid.0, members = ids.len(), "reveal group registered");

        let animates = self.animates();
        let watch = options.watch_options();
        let window = options.safety_net.unwrap_or(self.cfg.reveal_safety_net);
        self.groups.insert(
            gid,
            RevealGroup {
                id: gid,
                targets: ids.clone(),
                options,
                triggered: !animates,
            },
        );

        if !animates {
            for tid in &ids {
                self.finish_target(*tid, RevealedBy::Immediate, true);
            }
            return Ok(gid);
        }

        for tid in &ids {
            if let Some(target) = self.targets.get_mut(tid) {
                if let Some(hidden) = target.hide() {
                    self.pending.push_change(&target.element, Patch::Style(hidden));
                }
                self.watcher.observe(WatchKey::Reveal(*tid), target.rect, watch);
            }
        }
        self.nets.arm(NetKey::Reveal(gid), window);

        if let Some(viewport) = self.viewport {
            let hit = ids.iter().any(|tid| {
                self.watcher.check(&WatchKey::Reveal(*tid), &viewport) == Some(Crossing::Enter)
            });
            if hit {
                self.trigger_group(gid, true);
            }
        }
        Ok(gid)
    }

    /// Register a count-up counter. Its live text is available through [`Engine::counter_text`].
    pub fn register_counter(
        &mut self,
        element: impl Into<String>,
        rect: Rect,
        target: i64,
        options: CounterOptions,
    ) -> Result<CounterId> {
        options.validate()?;
        let element = element.into();
        self.claim_elements([element.as_str()])?;

        let cid = self.ids.alloc_counter();
        let watch = options.watch_options();
        let window = options.safety_net.unwrap_or(self.cfg.counter_safety_net);
        let counter = CounterState::new(cid, element.clone(), rect, target, options);
        self.elements.insert(element, Disposer::Counter(cid));
        debug!(counter = cid.0, target, "counter registered");

        if !self.animates() {
            self.counters.insert(cid, counter);
            self.finish_counter(cid, RevealedBy::Immediate, true);
            return Ok(cid);
        }

        self.pending
            .push_change(&counter.element, Patch::Text(counter.text().to_string()));
        self.counters.insert(cid, counter);
        self.watcher.observe(WatchKey::Counter(cid), rect, watch);
        self.nets.arm(NetKey::Counter(cid), window);

        if let Some(viewport) = self.viewport {
            if self.watcher.check(&WatchKey::Counter(cid), &viewport) == Some(Crossing::Enter) {
                self.start_counter(cid);
            }
        }
        Ok(cid)
    }

    /// Register a scroll-linked parallax binding. With motion disabled the binding is
    /// kept (so it can attach later) but never moves the element.
    pub fn register_parallax(
        &mut self,
        element: impl Into<String>,
        rect: Rect,
        options: ParallaxOptions,
    ) -> Result<ParallaxId> {
        options.validate()?;
        let element = element.into();
        self.claim_elements([element.as_str()])?;

        let pid = self.ids.alloc_parallax();
        self.elements.insert(element.clone(), Disposer::Parallax(pid));
        self.parallax
            .insert(pid, ParallaxBinding::new(pid, element, rect, options));
        debug!(parallax = pid.0, "parallax registered");

        if self.animates() {
            self.attach_parallax(pid);
        }
        Ok(pid)
    }

    /// Register every declaration whose element is not known yet, e.g. after client-side
    /// navigation inserted new markup. Invalid declarations are skipped.
    pub fn scan(&mut self, decls: &[ElementDecl]) -> Vec<Disposer> {
        let mut registered = Vec::new();
        let mut grouped: IndexMap<String, (RevealOptions, Vec<(String, Rect)>)> = IndexMap::new();
        let mut seen = hashbrown::HashSet::new();

        for decl in decls {
            if self.elements.contains_key(&decl.element) || !seen.insert(decl.element.as_str()) {
                trace!(element = %decl.element, "scan skipped known element");
                continue;
            }
            let result = match &decl.kind {
                DeclKind::Reveal {
                    group: Some(name),
                    options,
                } => {
                    let entry = grouped.entry(name.clone()).or_insert_with(|| {
                        (
                            options.clone().unwrap_or_else(|| self.cfg.reveal.clone()),
                            Vec::new(),
                        )
                    });
                    entry.1.push((decl.element.clone(), decl.rect));
                    continue;
                }
                DeclKind::Reveal {
                    group: None,
                    options,
                } => {
                    let opts = options.clone().unwrap_or_else(|| self.cfg.reveal.clone());
                    self.register_reveal(decl.element.clone(), decl.rect, opts)
                        .map(Disposer::from)
                }
                DeclKind::Counter { target, options } => {
                    let opts = options.clone().unwrap_or_else(|| self.cfg.counter.clone());
                    self.register_counter(decl.element.clone(), decl.rect, *target, opts)
                        .map(Disposer::from)
                }
                DeclKind::Parallax { options } => {
                    let opts = options.unwrap_or(self.cfg.parallax);
                    self.register_parallax(decl.element.clone(), decl.rect, opts)
                        .map(Disposer::from)
                }
            };
            match result {
                Ok(disposer) => registered.push(disposer),
                Err(err) => warn!(element = %decl.element, %err, "scan skipped declaration"),
            }
        }

        for (name, (opts, members)) in grouped {
            match self.register_reveal_group(members, opts) {
                Ok(gid) => registered.push(Disposer::Reveal(gid)),
                Err(err) => warn!(group = %name, %err, "scan skipped reveal group"),
            }
        }
        registered
    }

    // ---------------------------------------------------------------------------------------
    // Teardown
    // ---------------------------------------------------------------------------------------

    /// Tear down a registration: unobserve, cancel tweens and safety nets, drop pending
    /// changes for its elements and pending events it raised. Stale or repeated disposers are no-ops.
    pub fn dispose(&mut self, disposer: impl Into<Disposer>) -> bool {
        let disposer = disposer.into();
        let removed = self.dispose_registration(disposer);
        if removed {
            self.pending.forget_owner(disposer);
        }
        removed
    }

    fn dispose_registration(&mut self, disposer: Disposer) -> bool {
        match disposer {
            Disposer::Reveal(gid) => {
                let Some(group) = self.groups.shift_remove(&gid) else {
                    return false;
                };
                self.nets.cancel(&NetKey::Reveal(gid));
                for tid in group.targets {
                    self.watcher.unobserve(&WatchKey::Reveal(tid));
                    if let Some(target) = self.targets.shift_remove(&tid) {
                        if let Some(tween) = target.tween() {
                            self.cancel_tween(tween);
                        }
                        self.forget_element(&target.element);
                    }
                }
                debug!(group = gid.0, "reveal group disposed");
                true
            }
            Disposer::Counter(cid) => {
                let Some(counter) = self.counters.shift_remove(&cid) else {
                    return false;
                };
                self.nets.cancel(&NetKey::Counter(cid));
                self.watcher.unobserve(&WatchKey::Counter(cid));
                if let Some(tween) = counter.tween() {
                    self.cancel_tween(tween);
                }
                self.forget_element(&counter.element);
                debug!(counter = cid.0, "counter disposed");
                true
            }
            Disposer::Parallax(pid) => {
                let Some(binding) = self.parallax.shift_remove(&pid) else {
                    return false;
                };
                self.watcher.unobserve(&WatchKey::Parallax(pid));
                self.forget_element(&binding.element);
                debug!(parallax = pid.0, "parallax disposed");
                true
            }
        }
    }

    /// Dispose every registration (page teardown).
    pub fn reset_page(&mut self) {
        let all: Vec<Disposer> = self
            .groups
            .keys()
            .map(|g| Disposer::Reveal(*g))
            .chain(self.counters.keys().map(|c| Disposer::Counter(*c)))
            .chain(self.parallax.keys().map(|p| Disposer::Parallax(*p)))
            .collect();
        for disposer in all {
            self.dispose(disposer);
        }
    }

    fn forget_element(&mut self, element: &str) {
        self.elements.remove(element);
        self.pending.forget_element(element);
    }

    fn cancel_tween(&mut self, tween: TweenId) {
        self.tween_owners.remove(&tween);
        self.animator.cancel(tween);
    }

    // ---------------------------------------------------------------------------------------
    // Frame loop
    // ---------------------------------------------------------------------------------------

    /// Apply a reduced-motion change right away (same as passing it through `Inputs`).
    /// Changes produced here are delivered with the next update.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        if !self.motion.set_reduced(reduced) {
            return;
        }
        self.pending.push_event(RevealEvent::MotionChanged { reduced });
        if reduced {
            self.settle_everything();
        } else if self.cfg.interactive {
            let ids: Vec<ParallaxId> = self.parallax.keys().copied().collect();
            for pid in ids {
                self.attach_parallax(pid);
            }
        }
    }

    /// Changes produced since the last update (e.g. hidden styles from a registration),
    /// for hosts that must apply them before the next paint. They are not repeated by update().
    pub fn drain_pending(&mut self) -> Outputs {
        std::mem::take(&mut self.pending)
    }

    /// Step by `dt` seconds with the given inputs and return this frame's outputs.
    pub fn update(&mut self, dt: f32, inputs: Inputs) -> &Outputs {
        self.outputs.clear();
        self.outputs.append(&mut self.pending);
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        // 1) Inputs
        if let Some(reduced) = inputs.reduced_motion {
            self.set_reduced_motion(reduced);
            self.outputs.append(&mut self.pending);
        }
        let scrolled = inputs.viewport.is_some() && inputs.viewport != self.viewport;
        if inputs.viewport.is_some() {
            self.viewport = inputs.viewport;
        }
        let relaid = !inputs.rects.is_empty();
        for upd in inputs.rects {
            self.update_rect(&upd.element, upd.rect);
        }
        self.clock += dt;

        // 2) Tweens
        for frame in self.animator.advance(dt) {
            self.apply_tween_frame(frame);
        }

        // 3) Watcher
        if let Some(viewport) = self.viewport {
            for (key, crossing) in self.watcher.evaluate(&viewport) {
                self.dispatch_crossing(key, crossing);
            }
            // 4) Parallax
            if scrolled || relaid {
                self.sample_parallax(&viewport);
            }
        }

        // 5) Safety nets
        for key in self.nets.advance(dt) {
            match key {
                NetKey::Reveal(gid) => self.expire_group(gid),
                NetKey::Counter(cid) => self.expire_counter(cid),
            }
        }

        self.outputs.append(&mut self.pending);
        &self.outputs
    }

    fn update_rect(&mut self, element: &str, rect: Rect) {
        let Some(owner) = self.elements.get(element).copied() else {
            return;
        };
        match owner {
            Disposer::Reveal(gid) => {
                let tid = self.groups.get(&gid).and_then(|g| {
                    g.targets
                        .iter()
                        .copied()
                        .find(|t| self.targets.get(t).is_some_and(|x| x.element == element))
                });
                if let Some(target) = tid.and_then(|t| self.targets.get_mut(&t)) {
                    target.rect = rect;
                    self.watcher.update_rect(&WatchKey::Reveal(target.id), rect);
                }
            }
            Disposer::Counter(cid) => {
                if let Some(counter) = self.counters.get_mut(&cid) {
                    counter.rect = rect;
                    self.watcher.update_rect(&WatchKey::Counter(cid), rect);
                }
            }
            Disposer::Parallax(pid) => {
                if let Some(binding) = self.parallax.get_mut(&pid) {
                    binding.rect = rect;
                    self.watcher.update_rect(&WatchKey::Parallax(pid), rect);
                }
            }
        }
    }

    fn dispatch_crossing(&mut self, key: WatchKey, crossing: Crossing) {
        match (key, crossing) {
            (WatchKey::Reveal(tid), Crossing::Enter) => {
                if let Some(gid) = self.targets.get(&tid).map(|t| t.group) {
                    self.trigger_group(gid, false);
                }
            }
            (WatchKey::Counter(cid), Crossing::Enter) => self.start_counter(cid),
            (WatchKey::Parallax(pid), crossing) => {
                if let Some(binding) = self.parallax.get_mut(&pid) {
                    binding.active = crossing == Crossing::Enter;
                    if let Some(viewport) = self.viewport {
                        // Leaving still settles on the clamped end of the range.
                        if let Some([x, y]) = binding.sample(&viewport) {
                            self.outputs
                                .push_change(&binding.element, Patch::Translate { x, y });
                        }
                    }
                }
            }
            (_, Crossing::Leave) => {}
        }
    }

    // ---------------------------------------------------------------------------------------
    // Reveal groups
    // ---------------------------------------------------------------------------------------

    fn sink(&mut self, to_pending: bool) -> &mut Outputs {
        if to_pending {
            &mut self.pending
        } else {
            &mut self.outputs
        }
    }

    fn trigger_group(&mut self, gid: GroupId, to_pending: bool) {
        let Some(group) = self.groups.get_mut(&gid) else {
            return;
        };
        if group.triggered {
            return;
        }
        group.triggered = true;
        let options = group.options.clone();
        let members = group.targets.clone();
        debug!(group = gid.0, at = self.clock, "reveal group triggered");

        for tid in &members {
            self.watcher.unobserve(&WatchKey::Reveal(*tid));
            let Some(target) = self.targets.get_mut(tid) else {
                continue;
            };
            if !target.is_hidden() {
                continue;
            }
            let tween = self.animator.animate(TweenSpec {
                delay: options.delay_for(target.index),
                duration: options.duration,
                ease: options.ease,
            });
            target.begin(tween);
            self.tween_owners.insert(tween, TweenOwner::Reveal(*tid));
        }
        let at = self.clock;
        self.sink(to_pending)
            .push_event(RevealEvent::GroupTriggered { group: gid, at });
    }

    fn apply_tween_frame(&mut self, frame: TweenFrame) {
        let Some(owner) = self.tween_owners.get(&frame.id).copied() else {
            return;
        };
        if frame.completed {
            self.tween_owners.remove(&frame.id);
        }
        match owner {
            TweenOwner::Reveal(tid) => {
                let at = self.clock;
                let Some(target) = self.targets.get_mut(&tid) else {
                    return;
                };
                if target.tween() != Some(frame.id) {
                    return;
                }
                if frame.started {
                    trace!(target = tid.0, at, "reveal started");
                    self.outputs.push_event(RevealEvent::TargetStarted {
                        target: tid,
                        group: target.group,
                        index: target.index,
                        at,
                    });
                }
                if frame.completed {
                    self.finish_target(tid, RevealedBy::Animation, false);
                } else if let Some(state) = target.apply_progress(frame.progress) {
                    self.outputs
                        .push_change(&target.element, Patch::Style(state));
                }
            }
            TweenOwner::Counter(cid) => {
                let at = self.clock;
                let Some(counter) = self.counters.get_mut(&cid) else {
                    return;
                };
                if counter.tween() != Some(frame.id) {
                    return;
                }
                if frame.started {
                    self.outputs
                        .push_event(RevealEvent::CounterStarted { counter: cid, at });
                }
                if frame.completed {
                    self.finish_counter(cid, RevealedBy::Animation, false);
                } else if let Some(text) = counter.apply_progress(frame.progress) {
                    self.outputs.push_change(&counter.element, Patch::Text(text));
                }
            }
        }
    }

    /// The one path into `Visible`. Idempotent: already final targets are left untouched.
    fn finish_target(&mut self, tid: TargetId, via: RevealedBy, to_pending: bool) {
        let at = self.clock;
        let Some(target) = self.targets.get_mut(&tid) else {
            return;
        };
        let tween = target.tween();
        if !target.mark_visible(via) {
            return;
        }
        let gid = target.group;
        let element = target.element.clone();
        self.watcher.unobserve(&WatchKey::Reveal(tid));
        if let Some(tween) = tween {
            if via != RevealedBy::Animation {
                self.cancel_tween(tween);
            }
        }
        let out = self.sink(to_pending);
        out.push_change(&element, Patch::Style(VisualState::RESTING));
        out.push_event(RevealEvent::TargetRevealed {
            target: tid,
            group: gid,
            via,
            at,
        });

        let done = self.groups.get(&gid).is_some_and(|g| {
            g.targets
                .iter()
                .all(|t| self.targets.get(t).map_or(true, RevealTarget::is_final))
        });
        if done && self.nets.cancel(&NetKey::Reveal(gid)) {
            trace!(group = gid.0, "safety net cancelled");
        }
    }

    fn expire_group(&mut self, gid: GroupId) {
        let Some(group) = self.groups.get_mut(&gid) else {
            return;
        };
        group.triggered = true;
        let members = group.targets.clone();
        let mut forced = 0usize;
        for tid in members {
            let concealed = self
                .targets
                .get(&tid)
                .is_some_and(|t| !t.is_final() && t.state().is_concealed());
            self.watcher.unobserve(&WatchKey::Reveal(tid));
            if concealed {
                self.finish_target(tid, RevealedBy::SafetyNet, false);
                forced += 1;
            }
        }
        if forced > 0 {
            debug!(group = gid.0, forced, "safety net forced reveal");
        }
    }

    // ---------------------------------------------------------------------------------------
    // Counters
    // ---------------------------------------------------------------------------------------

    fn start_counter(&mut self, cid: CounterId) {
        let Some(counter) = self.counters.get_mut(&cid) else {
            return;
        };
        if counter.tween().is_some() || counter.is_done() {
            return;
        }
        let tween = self.animator.animate(TweenSpec {
            delay: counter.options.delay,
            duration: counter.options.duration,
            ease: counter.options.ease,
        });
        counter.begin(tween);
        self.tween_owners.insert(tween, TweenOwner::Counter(cid));
        self.watcher.unobserve(&WatchKey::Counter(cid));
        debug!(counter = cid.0, at = self.clock, "counter triggered");
    }

    fn finish_counter(&mut self, cid: CounterId, via: RevealedBy, to_pending: bool) {
        let at = self.clock;
        let Some(counter) = self.counters.get_mut(&cid) else {
            return;
        };
        let tween = counter.tween();
        let Some(text) = counter.finish() else {
            return;
        };
        let element = counter.element.clone();
        self.watcher.unobserve(&WatchKey::Counter(cid));
        self.nets.cancel(&NetKey::Counter(cid));
        if let Some(tween) = tween {
            if via != RevealedBy::Animation {
                self.cancel_tween(tween);
            }
        }
        let out = self.sink(to_pending);
        out.push_change(&element, Patch::Text(text.clone()));
        out.push_event(RevealEvent::CounterFinished {
            counter: cid,
            text,
            via,
            at,
        });
    }

    fn expire_counter(&mut self, cid: CounterId) {
        let pending = self
            .counters
            .get(&cid)
            .is_some_and(|c| !c.is_done() && c.awaiting_first_frame());
        if pending {
            debug!(counter = cid.0, "safety net published final counter value");
            self.finish_counter(cid, RevealedBy::SafetyNet, false);
        }
    }

    // ---------------------------------------------------------------------------------------
    // Parallax
    // ---------------------------------------------------------------------------------------

    fn attach_parallax(&mut self, pid: ParallaxId) {
        let margin = self.cfg.parallax_margin;
        let viewport = self.viewport;
        let Some(binding) = self.parallax.get_mut(&pid) else {
            return;
        };
        if binding.attached {
            return;
        }
        binding.attached = true;
        self.watcher.observe(
            WatchKey::Parallax(pid),
            binding.rect,
            WatchOptions {
                threshold: 0.0,
                root_margin: RootMargin::vertical(margin),
                start_line: None,
                once: false,
            },
        );
        let mut sampled = None;
        if let Some(viewport) = viewport {
            if self.watcher.check(&WatchKey::Parallax(pid), &viewport) == Some(Crossing::Enter) {
                binding.active = true;
                sampled = binding.sample(&viewport);
            }
        }
        if let Some([x, y]) = sampled {
            self.pending
                .push_change(&binding.element, Patch::Translate { x, y });
        }
        self.pending
            .push_event(RevealEvent::ParallaxAttached { parallax: pid });
    }

    fn detach_parallax(&mut self, pid: ParallaxId) {
        let Some(binding) = self.parallax.get_mut(&pid) else {
            return;
        };
        if !binding.attached {
            return;
        }
        binding.attached = false;
        let moved = binding.reset();
        let element = binding.element.clone();
        self.watcher.unobserve(&WatchKey::Parallax(pid));
        if moved {
            self.pending.push_change(&element, Patch::ClearTransform);
        }
        self.pending
            .push_event(RevealEvent::ParallaxDetached { parallax: pid });
    }

    fn sample_parallax(&mut self, viewport: &Viewport) {
        for binding in self.parallax.values_mut() {
            if !binding.attached || !binding.active {
                continue;
            }
            if let Some([x, y]) = binding.sample(viewport) {
                self.outputs
                    .push_change(&binding.element, Patch::Translate { x, y });
            }
        }
    }

    /// Reduced motion switched on: everything jumps to its final state.
    fn settle_everything(&mut self) {
        let targets: Vec<TargetId> = self
            .targets
            .values()
            .filter(|t| !t.is_final())
            .map(|t| t.id)
            .collect();
        for tid in targets {
            self.finish_target(tid, RevealedBy::Immediate, true);
        }
        let groups: Vec<GroupId> = self.groups.keys().copied().collect();
        for gid in groups {
            if let Some(group) = self.groups.get_mut(&gid) {
                group.triggered = true;
            }
            self.nets.cancel(&NetKey::Reveal(gid));
        }
        let counters: Vec<CounterId> = self.counters.keys().copied().collect();
        for cid in counters {
            self.finish_counter(cid, RevealedBy::Immediate, true);
        }
        let bindings: Vec<ParallaxId> = self.parallax.keys().copied().collect();
        for pid in bindings {
            self.detach_parallax(pid);
        }
    }

    // ---------------------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------------------

    pub fn group_targets(&self, gid: GroupId) -> Option<&[TargetId]> {
        self.groups.get(&gid).map(|g| g.targets.as_slice())
    }

    pub fn target_state(&self, tid: TargetId) -> Option<VisualState> {
        self.targets.get(&tid).map(RevealTarget::state)
    }

    pub fn target_phase(&self, tid: TargetId) -> Option<RevealPhase> {
        self.targets.get(&tid).map(RevealTarget::phase)
    }

    /// Current style of a registered element, by element key.
    pub fn element_state(&self, element: &str) -> Option<VisualState> {
        self.targets
            .values()
            .find(|t| t.element == element)
            .map(RevealTarget::state)
    }

    /// Live text source of a counter.
    pub fn counter_text(&self, cid: CounterId) -> Option<&str> {
        self.counters.get(&cid).map(CounterState::text)
    }

    pub fn counter(&self, cid: CounterId) -> Option<&CounterState> {
        self.counters.get(&cid)
    }

    pub fn parallax_offset(&self, pid: ParallaxId) -> Option<[f32; 2]> {
        self.parallax.get(&pid).and_then(ParallaxBinding::offset)
    }

    pub fn parallax_binding(&self, pid: ParallaxId) -> Option<&ParallaxBinding> {
        self.parallax.get(&pid)
    }

    pub fn is_registered(&self, element: &str) -> bool {
        self.elements.contains_key(element)
    }

    pub fn observed_count(&self) -> usize {
        self.watcher.len()
    }

    pub fn armed_safety_nets(&self) -> usize {
        self.nets.len()
    }

    pub fn live_tweens(&self) -> usize {
        self.tween_owners.len()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
