use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use unveil_core::{ElementDecl, Engine, Inputs, Rect, Viewport};

fn page(cards: usize) -> Vec<ElementDecl> {
    (0..cards)
        .map(|i| {
            let y = 200.0 + (i / 4) as f32 * 360.0;
            let x = 40.0 + (i % 4) as f32 * 300.0;
            let rect = Rect::new(x, y, 280.0, 320.0);
            match i % 10 {
                0 => ElementDecl::counter(format!("#stat-{i}"), rect, 1000 + i as i64),
                1 => ElementDecl::parallax(format!("#bg-{i}"), rect),
                _ => ElementDecl::reveal(format!(".card-{i}"), rect).in_group(format!("row-{}", i / 4)),
            }
        })
        .collect()
}

fn bench_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll");
    for &size in &[16usize, 128, 1024] {
        let decls = page(size);
        let depth = 200.0 + (size / 4) as f32 * 360.0;
        group.bench_with_input(BenchmarkId::from_parameter(size), &decls, |b, decls| {
            b.iter(|| {
                let mut engine = Engine::default();
                engine.scan(decls);
                let mut scroll = 0.0;
                while scroll < depth {
                    let vp = Viewport::new(1280.0, 800.0).scrolled_to(scroll);
                    black_box(engine.update(1.0 / 60.0, Inputs::viewport(vp)));
                    scroll += 120.0;
                }
            });
        });
    }
    group.finish();
}

fn bench_idle_tick(c: &mut Criterion) {
    let mut engine = Engine::default();
    engine.scan(&page(512));
    engine.update(1.0 / 60.0, Inputs::viewport(Viewport::new(1280.0, 800.0)));
    c.bench_function("idle_tick_512", |b| {
        b.iter(|| black_box(engine.update(1.0 / 60.0, Inputs::default()).changes.len()));
    });
}

criterion_group!(benches, bench_scroll, bench_idle_tick);
criterion_main!(benches);
