use std::cell::RefCell;
use std::rc::Rc;

use unveil_core::{
    Animator, CounterOptions, Engine, Inputs, Outputs, ParallaxOptions, Patch, Rect,
    RevealEvent, RevealOptions, RevealPhase, RevealedBy, TweenFrame, TweenId, TweenSpec,
    Viewport, VisualState,
};

const DT: f32 = 1.0 / 64.0;

fn init_tracing() {
    let default_filter = "unveil_core=debug";
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn viewport(scroll_y: f32) -> Viewport {
    Viewport::new(1280.0, 800.0).scrolled_to(scroll_y)
}

fn run(engine: &mut Engine, seconds: f32) -> Vec<Outputs> {
    let frames = (seconds / DT).ceil() as usize;
    (0..frames)
        .map(|_| engine.update(DT, Inputs::default()).clone())
        .collect()
}

fn texts(frames: &[Outputs], element: &str) -> Vec<String> {
    frames
        .iter()
        .flat_map(|o| o.changes_for(element).cloned().collect::<Vec<_>>())
        .filter_map(|p| match p {
            Patch::Text(t) => Some(t),
            _ => None,
        })
        .collect()
}

fn parse_count(text: &str) -> i64 {
    text.trim_end_matches('+').replace(',', "").parse().unwrap()
}

#[test]
fn counter_counts_up_to_exact_grouped_target() {
    init_tracing();
    let mut engine = Engine::default();
    let opts = CounterOptions {
        suffix: "+".into(),
        duration: 2.5,
        ..CounterOptions::default()
    };
    let cid = engine
        .register_counter("#stat", Rect::new(0.0, 300.0, 280.0, 120.0), 1000, opts)
        .unwrap();
    assert_eq!(engine.counter_text(cid), Some("0+"));

    let mut frames = vec![engine.update(DT, Inputs::viewport(viewport(0.0))).clone()];
    frames.extend(run(&mut engine, 3.0));

    let shown = texts(&frames, "#stat");
    assert_eq!(shown.first().map(String::as_str), Some("0+"));
    assert_eq!(shown.last().map(String::as_str), Some("1,000+"));
    assert!(shown.len() > 10, "{shown:?}");
    let values: Vec<i64> = shown.iter().map(|t| parse_count(t)).collect();
    assert!(values.windows(2).all(|w| w[1] >= w[0]), "{values:?}");

    let finished = frames
        .iter()
        .flat_map(|o| o.events.iter())
        .find_map(|e| match e {
            RevealEvent::CounterFinished { text, via, .. } => Some((text.clone(), *via)),
            _ => None,
        });
    assert_eq!(finished, Some(("1,000+".to_string(), RevealedBy::Animation)));
    assert_eq!(engine.counter_text(cid), Some("1,000+"));
    assert_eq!(engine.armed_safety_nets(), 0);

    let idle = run(&mut engine, 5.0);
    assert!(texts(&idle, "#stat").is_empty());
}

#[test]
fn reduced_motion_renders_final_values_on_first_render() {
    init_tracing();
    let mut engine = Engine::default().with_motion_query(&Some(true));
    let opts = CounterOptions {
        suffix: "+".into(),
        ..CounterOptions::default()
    };
    let cid = engine
        .register_counter("#stat", Rect::new(0.0, 2000.0, 280.0, 120.0), 42, opts)
        .unwrap();
    let gid = engine
        .register_reveal("#card", Rect::new(0.0, 2400.0, 280.0, 120.0), RevealOptions::default())
        .unwrap();
    assert_eq!(engine.counter_text(cid), Some("42+"));

    let mut frames = Vec::new();
    for scroll in [0.0, 1200.0, 1800.0, 2200.0] {
        frames.push(engine.update(DT, Inputs::viewport(viewport(scroll))).clone());
    }
    frames.extend(run(&mut engine, 5.0));

    assert_eq!(texts(&frames, "#stat"), vec!["42+".to_string()]);
    let styles: Vec<Patch> = frames
        .iter()
        .flat_map(|o| o.changes_for("#card").cloned().collect::<Vec<_>>())
        .collect();
    assert_eq!(styles, vec![Patch::Style(VisualState::RESTING)]);
    let tid = engine.group_targets(gid).unwrap()[0];
    assert_eq!(
        engine.target_phase(tid),
        Some(RevealPhase::Visible {
            via: RevealedBy::Immediate
        })
    );
    assert_eq!(engine.live_tweens(), 0);
}

#[test]
fn counter_safety_net_publishes_final_text_when_never_seen() {
    let mut engine = Engine::default();
    let cid = engine
        .register_counter(
            "#offscreen",
            Rect::new(0.0, 9000.0, 100.0, 40.0),
            12_500,
            CounterOptions::default(),
        )
        .unwrap();
    let early = run(&mut engine, 3.9);
    assert!(texts(&early, "#offscreen").iter().all(|t| t == "0"));
    let late = run(&mut engine, 0.2);
    assert_eq!(texts(&late, "#offscreen"), vec!["12,500".to_string()]);
    assert_eq!(engine.counter_text(cid), Some("12,500"));
    assert!(engine.counter(cid).unwrap().is_done());
}

#[derive(Debug, Default)]
struct StalledAnimator {
    next: u32,
}

impl Animator for StalledAnimator {
    fn animate(&mut self, _spec: TweenSpec) -> TweenId {
        self.next += 1;
        TweenId(self.next)
    }

    fn cancel(&mut self, _id: TweenId) -> bool {
        true
    }

    fn advance(&mut self, _dt: f32) -> Vec<TweenFrame> {
        Vec::new()
    }

    fn is_active(&self, _id: TweenId) -> bool {
        true
    }
}

#[test]
fn counter_safety_net_covers_a_stalled_tween() {
    init_tracing();
    let mut engine = Engine::default().with_animator(Box::new(StalledAnimator::default()));
    let cid = engine
        .register_counter("#stuck", Rect::new(0.0, 300.0, 100.0, 40.0), 7, CounterOptions::default())
        .unwrap();
    engine.update(DT, Inputs::viewport(viewport(0.0)));
    assert!(engine.counter(cid).unwrap().tween().is_some());

    let frames = run(&mut engine, 4.1);
    assert_eq!(engine.counter_text(cid), Some("7"));
    let via = frames
        .iter()
        .flat_map(|o| o.events.iter())
        .find_map(|e| match e {
            RevealEvent::CounterFinished { via, .. } => Some(*via),
            _ => None,
        });
    assert_eq!(via, Some(RevealedBy::SafetyNet));
    assert_eq!(engine.live_tweens(), 0);
}

#[test]
fn parallax_scrubs_between_plus_and_minus_speed_times_height() {
    init_tracing();
    let mut engine = Engine::default();
    let pid = engine
        .register_parallax("#bg", Rect::new(0.0, 1000.0, 600.0, 400.0), ParallaxOptions::default())
        .unwrap();

    let first = engine.update(DT, Inputs::viewport(viewport(200.0))).clone();
    assert!(first
        .events
        .iter()
        .any(|e| matches!(e, RevealEvent::ParallaxAttached { .. })));
    let [x, y] = engine.parallax_offset(pid).unwrap();
    approx(x, 0.0, 0.0);
    approx(y, 80.0, 1e-3);

    engine.update(DT, Inputs::viewport(viewport(1400.0)));
    approx(engine.parallax_offset(pid).unwrap()[1], -80.0, 1e-3);

    let mid = engine.update(DT, Inputs::viewport(viewport(800.0))).clone();
    approx(engine.parallax_offset(pid).unwrap()[1], 0.0, 1e-3);
    assert!(matches!(
        mid.changes_for("#bg").next(),
        Some(Patch::Translate { .. })
    ));

    engine.update(DT, Inputs::viewport(viewport(3000.0)));
    assert!(!engine.parallax_binding(pid).unwrap().active);
    let away = engine.update(DT, Inputs::viewport(viewport(3100.0)));
    assert!(away.changes_for("#bg").next().is_none());
}

#[test]
fn motion_preference_change_mid_session() {
    init_tracing();
    let mut engine = Engine::default();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    engine
        .motion_mut()
        .subscribe(move |reduced| sink.borrow_mut().push(reduced));

    let gid = engine
        .register_reveal("#below", Rect::new(0.0, 2000.0, 400.0, 200.0), RevealOptions::default())
        .unwrap();
    engine
        .register_counter("#count", Rect::new(0.0, 2600.0, 200.0, 100.0), 250, CounterOptions::default())
        .unwrap();
    let pid = engine
        .register_parallax("#hero-bg", Rect::new(0.0, 0.0, 1280.0, 720.0), ParallaxOptions::default())
        .unwrap();
    engine.update(DT, Inputs::viewport(viewport(0.0)));
    assert!(engine.parallax_offset(pid).is_some());

    let reduce = Inputs {
        reduced_motion: Some(true),
        ..Inputs::default()
    };
    let out = engine.update(DT, reduce).clone();
    assert!(out
        .events
        .contains(&RevealEvent::MotionChanged { reduced: true }));
    assert_eq!(
        out.changes_for("#below").cloned().collect::<Vec<_>>(),
        vec![Patch::Style(VisualState::RESTING)]
    );
    assert_eq!(
        out.changes_for("#count").cloned().collect::<Vec<_>>(),
        vec![Patch::Text("250".into())]
    );
    assert_eq!(
        out.changes_for("#hero-bg").cloned().collect::<Vec<_>>(),
        vec![Patch::ClearTransform]
    );
    assert_eq!(engine.armed_safety_nets(), 0);
    assert_eq!(engine.observed_count(), 0);
    assert!(engine.motion().prefers_reduced());
    assert_eq!(*seen.borrow(), vec![true]);

    let restore = Inputs {
        reduced_motion: Some(false),
        ..Inputs::default()
    };
    let out = engine.update(DT, restore).clone();
    assert!(matches!(
        out.changes_for("#hero-bg").next(),
        Some(Patch::Translate { .. })
    ));
    let tid = engine.group_targets(gid).unwrap()[0];
    assert_eq!(
        engine.target_phase(tid),
        Some(RevealPhase::Visible {
            via: RevealedBy::Immediate
        })
    );
    assert_eq!(*seen.borrow(), vec![true, false]);

    let repeat = Inputs {
        reduced_motion: Some(false),
        ..Inputs::default()
    };
    assert!(engine.update(DT, repeat).events.is_empty());
}

#[test]
fn disposing_a_counter_mid_count_stops_all_mutation() {
    init_tracing();
    let mut engine = Engine::default();
    let cid = engine
        .register_counter("#users", Rect::new(0.0, 300.0, 200.0, 80.0), 5000, CounterOptions::default())
        .unwrap();
    engine.update(DT, Inputs::viewport(viewport(0.0)));
    let counting = run(&mut engine, 0.5);
    assert!(!texts(&counting, "#users").is_empty());
    assert!(!engine.counter(cid).unwrap().is_done());
    assert_eq!(engine.live_tweens(), 1);

    assert!(engine.dispose(cid));
    assert_eq!(engine.live_tweens(), 0);
    assert_eq!(engine.armed_safety_nets(), 0);
    assert_eq!(engine.observed_count(), 0);
    assert!(engine.counter_text(cid).is_none());

    let after = run(&mut engine, 6.0);
    assert!(texts(&after, "#users").is_empty());
    assert!(after.iter().all(|o| o.events.is_empty()));
    assert!(!engine.dispose(cid));
}

#[test]
fn disposed_parallax_never_translates_again() {
    init_tracing();
    let mut engine = Engine::default();
    let pid = engine
        .register_parallax("#bg", Rect::new(0.0, 1000.0, 600.0, 400.0), ParallaxOptions::default())
        .unwrap();
    engine.update(DT, Inputs::viewport(viewport(200.0)));
    assert!(engine.parallax_offset(pid).is_some());

    assert!(engine.dispose(pid));
    assert!(engine.parallax_binding(pid).is_none());
    for scroll in [400.0, 800.0, 1200.0] {
        let out = engine.update(DT, Inputs::viewport(viewport(scroll)));
        assert!(out.changes_for("#bg").next().is_none());
        assert!(out.events.is_empty());
    }
}
