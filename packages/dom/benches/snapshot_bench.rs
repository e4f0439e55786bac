use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagecraft_dom::parse_document;

fn sample_page(blocks: usize) -> String {
    let mut body = String::new();
    for i in 0..blocks {
        body.push_str(&format!(
            "<div class=\"card\" style=\"position: absolute; left: {}px; top: {}px\"><h2>Title {}</h2><p>Body text &amp; more</p><img src=\"img/{}.png\"></div>",
            i * 10,
            i * 20,
            i,
            i
        ));
    }
    format!(
        "<!DOCTYPE html><html><head><title>Bench</title></head><body>{}</body></html>",
        body
    )
}

fn bench_parse(c: &mut Criterion) {
    let page = sample_page(200);
    c.bench_function("parse_page_200_blocks", |b| {
        b.iter(|| parse_document(black_box(&page)).unwrap())
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let doc = parse_document(&sample_page(200)).unwrap();
    c.bench_function("body_snapshot_200_blocks", |b| {
        b.iter(|| black_box(&doc).body_html())
    });
}

fn bench_replace_body(c: &mut Criterion) {
    let doc = parse_document(&sample_page(200)).unwrap();
    let body = doc.body_html();
    c.bench_function("replace_body_200_blocks", |b| {
        b.iter(|| parse_document(&doc.markup_with_body(black_box(&body))).unwrap())
    });
}

criterion_group!(benches, bench_parse, bench_snapshot, bench_replace_body);
criterion_main!(benches);
