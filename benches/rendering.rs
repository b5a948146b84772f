//! Benchmarks for preview rendering.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mdview::render::NativeRenderer;
use mdview::ui::html_to_lines;

fn sample_markdown() -> String {
    let mut md = String::from("# Benchmark\n\n");
    for i in 0..200 {
        md.push_str(&format!(
            "## Section {i}\n\nSome *emphasis* and `code` in paragraph {i}.\n\n- one\n- two\n\n```rust\nfn f{i}() -> u32 {{ {i} }}\n```\n\n"
        ));
    }
    md
}

fn bench_markdown_to_html(c: &mut Criterion) {
    let md = sample_markdown();
    c.bench_function("markdown_to_html", |b| {
        b.iter(|| NativeRenderer::markdown(black_box(&md)))
    });
}

fn bench_html_to_lines(c: &mut Criterion) {
    let html = NativeRenderer::markdown(&sample_markdown());
    c.bench_function("html_to_lines", |b| b.iter(|| html_to_lines(black_box(&html))));
}

criterion_group!(benches, bench_markdown_to_html, bench_html_to_lines);
criterion_main!(benches);
