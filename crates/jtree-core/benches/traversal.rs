use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use jtree_core::{Document, Format, SearchOptions};

/// A catalogue of `items` records, each with a nested attribute object and a
/// tag list, roughly the shape of a paged API response.
fn sample_document(items: usize) -> String {
    let mut out = String::from(r#"{"meta":{"page":1,"total":"#);
    out.push_str(&items.to_string());
    out.push_str(r#"},"items":["#);
    for i in 0..items {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!(
            r#"{{"id":{i},"name":"item-{i}","price":{}.5,"attrs":{{"color":"c{}","size":{},"id":"a{i}"}},"tags":["x","y","z"]}}"#,
            i % 97,
            i % 7,
            i % 5
        ));
    }
    out.push_str("]}");
    out
}

fn bench_parse(c: &mut Criterion) {
    let text = sample_document(2_000);
    c.bench_function("parse 2k items", |b| {
        b.iter(|| Document::parse_str(black_box(&text)).unwrap())
    });
}

fn bench_walk(c: &mut Criterion) {
    let doc = Document::parse_str(&sample_document(2_000)).unwrap();
    let root = doc.root_id().unwrap();
    c.bench_function("walk 2k items", |b| {
        b.iter(|| doc.walk(black_box(root)).unwrap().count())
    });
}

fn bench_query(c: &mut Criterion) {
    let doc = Document::parse_str(&sample_document(2_000)).unwrap();
    c.bench_function("query deep key", |b| {
        b.iter(|| doc.root().query(black_box("$...id")).unwrap().len())
    });
    c.bench_function("query nested deep key", |b| {
        b.iter(|| {
            doc.root()
                .query_with("$.items[...]...id", SearchOptions::default().with_nested(true))
                .unwrap()
                .len()
        })
    });
}

fn bench_stringify(c: &mut Criterion) {
    let doc = Document::parse_str(&sample_document(2_000)).unwrap();
    c.bench_function("stringify compact", |b| {
        b.iter(|| doc.root().stringify(black_box(&Format::compact())))
    });
    c.bench_function("stringify pretty", |b| {
        b.iter(|| doc.root().stringify(black_box(&Format::pretty(2))))
    });
}

fn bench_sort(c: &mut Criterion) {
    let doc = Document::parse_str(&sample_document(2_000)).unwrap();
    c.bench_function("sort tree keys", |b| {
        b.iter_batched(
            || doc.clone(),
            |mut doc| {
                let root = doc.root_id().unwrap();
                doc.sort_tree_keys(root).unwrap();
                doc
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_walk,
    bench_query,
    bench_stringify,
    bench_sort
);
criterion_main!(benches);
