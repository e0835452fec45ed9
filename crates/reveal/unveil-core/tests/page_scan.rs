use unveil_core::{
    Config, Disposer, ElementDecl, Engine, Inputs, Patch, Rect, Viewport, VisualState,
};
use unveil_test_fixtures::{configs, pages};

const DT: f32 = 1.0 / 64.0;

const HOME_REVEALS: [&str; 5] = [
    "#hero-title",
    ".card-1",
    ".card-2",
    ".card-3",
    "#footer-cta",
];

fn init_tracing() {
    let default_filter = "unveil_core=debug";
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

fn viewport(scroll_y: f32) -> Viewport {
    Viewport::new(1280.0, 800.0).scrolled_to(scroll_y)
}

fn counter_texts(engine: &Engine, registered: &[Disposer]) -> Vec<String> {
    let mut texts: Vec<String> = registered
        .iter()
        .filter_map(|d| match d {
            Disposer::Counter(cid) => engine.counter_text(*cid).map(str::to_string),
            _ => None,
        })
        .collect();
    texts.sort();
    texts
}

#[test]
fn every_fixture_page_scans_cleanly() {
    init_tracing();
    for key in pages::keys().unwrap() {
        let decls: Vec<ElementDecl> = pages::load(&key).unwrap();
        let mut engine = Engine::default();
        let registered = engine.scan(&decls);
        assert!(!registered.is_empty(), "page {key} registered nothing");
        for decl in &decls {
            assert!(engine.is_registered(&decl.element), "{} missing", decl.element);
        }
    }
}

#[test]
fn scrolling_the_home_page_settles_everything() {
    init_tracing();
    let decls: Vec<ElementDecl> = pages::load("home").unwrap();
    let mut engine = Engine::default();
    let registered = engine.scan(&decls);
    // hero, parallax, two counters, footer, then the card group
    assert_eq!(registered.len(), 6);
    assert!(matches!(registered.last(), Some(Disposer::Reveal(_))));
    if let Some(Disposer::Reveal(cards)) = registered.last() {
        assert_eq!(engine.group_targets(*cards).map(<[_]>::len), Some(3));
    }

    let mut scroll = 0.0;
    while scroll <= 3200.0 {
        engine.update(DT, Inputs::viewport(viewport(scroll)));
        scroll += 200.0;
    }
    for _ in 0..(6.0 / DT) as usize {
        engine.update(DT, Inputs::default());
    }

    for element in HOME_REVEALS {
        assert_eq!(
            engine.element_state(element),
            Some(VisualState::RESTING),
            "{element} not settled"
        );
    }
    assert_eq!(
        counter_texts(&engine, &registered),
        vec!["1,000+".to_string(), "99%".to_string()]
    );
    assert_eq!(engine.armed_safety_nets(), 0);
    assert_eq!(engine.live_tweens(), 0);

    engine.reset_page();
    for decl in &decls {
        assert!(!engine.is_registered(&decl.element));
    }
    assert_eq!(engine.observed_count(), 0);
    let out = engine.update(DT, Inputs::viewport(viewport(0.0)));
    assert!(out.is_empty());
}

#[test]
fn rescanning_only_registers_new_elements() {
    let mut decls: Vec<ElementDecl> = pages::load("article").unwrap();
    let mut engine = Engine::default();
    let first = engine.scan(&decls);
    assert_eq!(first.len(), 4);
    assert!(engine.scan(&decls).is_empty());

    decls.push(ElementDecl::reveal("#comments", Rect::new(160.0, 3200.0, 960.0, 400.0)));
    decls.push(ElementDecl::reveal("#comments", Rect::new(160.0, 3200.0, 960.0, 400.0)));
    let second = engine.scan(&decls);
    assert_eq!(second.len(), 1);
    assert!(engine.is_registered("#comments"));
}

#[test]
fn scan_skips_invalid_declarations() {
    let raw = r##"[
        { "element": "#ok", "rect": { "x": 0, "y": 0, "width": 10, "height": 10 }, "kind": "reveal" },
        { "element": "#bad", "rect": { "x": 0, "y": 0, "width": 10, "height": 10 }, "kind": "counter",
          "target": 10, "options": { "duration": -2 } }
    ]"##;
    let decls: Vec<ElementDecl> = serde_json::from_str(raw).unwrap();
    let mut engine = Engine::default();
    assert_eq!(engine.scan(&decls).len(), 1);
    assert!(engine.is_registered("#ok"));
    assert!(!engine.is_registered("#bad"));
}

#[test]
fn static_config_renders_the_page_in_final_state() {
    let cfg = Config::from_json(&configs::json("static").unwrap()).unwrap();
    assert!(!cfg.interactive);
    let decls: Vec<ElementDecl> = pages::load("home").unwrap();
    let mut engine = Engine::new(cfg);
    let registered = engine.scan(&decls);

    let out = engine.drain_pending();
    for element in HOME_REVEALS {
        let patches: Vec<_> = out.changes_for(element).cloned().collect();
        assert_eq!(patches, vec![Patch::Style(VisualState::RESTING)], "{element}");
    }
    assert!(out.changes_for("#hero-bg").next().is_none());
    assert_eq!(
        counter_texts(&engine, &registered),
        vec!["1,000+".to_string(), "99%".to_string()]
    );
    assert_eq!(engine.armed_safety_nets(), 0);
}

#[test]
fn patient_config_overrides_defaults() {
    let cfg: Config = configs::load("patient").unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.reveal_safety_net, 6.0);
    assert_eq!(cfg.counter_safety_net, 8.0);
    assert_eq!(cfg.reveal.stagger, 0.15);
    assert_eq!(cfg.counter.duration, 3.0);
    assert_eq!(cfg.counter.suffix, "");
    assert_eq!(cfg.parallax_margin, Config::default().parallax_margin);
}
