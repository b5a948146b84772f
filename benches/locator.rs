//! Benchmarks for mapping preview text back to a caret offset.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mdview::locator::find_cursor_offset;

fn bench_find_cursor_offset(c: &mut Criterion) {
    let mut content = String::new();
    for i in 0..2_000 {
        content.push_str(&format!("Paragraph {i} with  some   **bold** text.\n\n"));
    }

    c.bench_function("find_cursor_offset_exact", |b| {
        b.iter(|| find_cursor_offset(black_box(&content), black_box("Paragraph 1999 with some")))
    });
    c.bench_function("find_cursor_offset_word_fallback", |b| {
        b.iter(|| find_cursor_offset(black_box(&content), black_box("nothing matches Paragraph")))
    });
}

criterion_group!(benches, bench_find_cursor_offset);
criterion_main!(benches);
