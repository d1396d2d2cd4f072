#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use jsonflat::{find_field_raw, pad_buffer, MapFraming, Parser};

fn synthetic_dataset() -> String {
    let mut json = String::with_capacity(1 << 20);
    json.push_str("{\"users\": [");
    for i in 0..1000 {
        if i > 0 {
            json.push(',');
        }
        json.push_str(&format!(
            r#"{{"id": {i}, "name": "User {i}", "balance": {}.{:02}, "profile": {{"bio": "Bio for user {i}", "age": {}, "active": {}}}, "tags": ["a", "b", "c"]}}"#,
            i * 7,
            i % 100,
            20 + (i % 50),
            i % 2 == 0
        ));
    }
    json.push_str("]}");
    json
}

fn synthetic_ndjson() -> Vec<u8> {
    let mut out = Vec::with_capacity(1 << 20);
    for i in 0..5000 {
        out.extend_from_slice(
            format!("{{\"id\":{i},\"name\":\"user-{i}\",\"score\":{}.5}}\n", i % 97).as_bytes(),
        );
    }
    out
}

fn bench_flatten(c: &mut Criterion) {
    let json = synthetic_dataset();
    let buf = pad_buffer(json.as_bytes());
    let mut group = c.benchmark_group("flatten");
    group.throughput(Throughput::Bytes(json.len() as u64));

    group.bench_function("token_stream", |b| {
        let mut parser = Parser::new();
        b.iter(|| black_box(parser.flatten(black_box(&buf), json.len()).unwrap()));
    });

    group.finish();
}

fn bench_fast_paths(c: &mut Criterion) {
    let json = synthetic_dataset();
    let buf = pad_buffer(json.as_bytes());
    let mut group = c.benchmark_group("fast_paths");
    group.throughput(Throughput::Bytes(json.len() as u64));

    group.bench_function("field_length", |b| {
        let mut parser = Parser::new();
        b.iter(|| {
            black_box(
                parser
                    .field_length(black_box(&buf), json.len(), &["users"])
                    .unwrap(),
            )
        });
    });

    group.bench_function("find_field_raw", |b| {
        b.iter(|| black_box(find_field_raw(black_box(&buf), json.len(), &["users"]).unwrap()));
    });

    group.bench_function("array_map_field", |b| {
        let mut parser = Parser::new();
        b.iter(|| {
            black_box(
                parser
                    .array_map_field(
                        black_box(&buf),
                        json.len(),
                        &["users"],
                        &["name"],
                        MapFraming::Array,
                    )
                    .unwrap(),
            )
        });
    });

    group.finish();
}

fn bench_ndjson(c: &mut Criterion) {
    let data = synthetic_ndjson();
    let buf = pad_buffer(&data);
    let mut group = c.benchmark_group("ndjson");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("count_documents", |b| {
        let mut parser = Parser::new();
        b.iter(|| black_box(parser.count_documents(black_box(&buf), data.len(), 1 << 20)));
    });

    group.bench_function("extract_field_total", |b| {
        let mut parser = Parser::new();
        b.iter(|| {
            black_box(parser.extract_field_total(black_box(&buf), data.len(), 1 << 20, "name"))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_flatten, bench_fast_paths, bench_ndjson);
criterion_main!(benches);
