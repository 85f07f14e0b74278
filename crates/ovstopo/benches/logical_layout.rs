use criterion::{Criterion, criterion_group, criterion_main};
use ovstopo::render::{HeadlessViewer, render_logical_svg};
use ovstopo::{DirectorySource, load_logical_topology};
use std::hint::black_box;
use std::path::PathBuf;

fn bench_logical_layout(c: &mut Criterion) {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/basic");
    let source = DirectorySource::new(root);
    let (_, logical) =
        futures::executor::block_on(load_logical_topology(&source, &source)).expect("fixture");
    let viewer = HeadlessViewer::new();

    let mut group = c.benchmark_group("logical_layout");
    group.sample_size(50);

    group.bench_function("basic_layout_and_svg_x50", |b| {
        b.iter(|| {
            let mut acc = 0usize;
            for _ in 0..50usize {
                let layout = viewer.layout_logical(black_box(&logical));
                acc ^= render_logical_svg(&layout).len();
            }
            black_box(acc);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_logical_layout);
criterion_main!(benches);
