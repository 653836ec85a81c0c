use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use nodewire::coerce;
use nodewire::{parse_bytes, Literal, Node, WireConfig};

fn results_payload(rows: usize) -> String {
    let bindings: Vec<String> = (0..rows)
        .map(|i| {
            format!(
                r#"{{"s":{{"type":"uri","value":"http://example.org/item/{}"}},"n":{{"type":"literal","value":"{}","datatype":"http://www.w3.org/2001/XMLSchema#int"}}}}"#,
                i, i
            )
        })
        .collect();
    format!(
        r#"{{"head":{{"vars":["s","n"]}},"results":{{"bindings":[{}]}}}}"#,
        bindings.join(",")
    )
}

fn ntriples_payload(rows: usize) -> String {
    (0..rows)
        .map(|i| {
            format!(
                "<http://example.org/item/{}> <http://example.org/label> \"item {}\"@en .\n",
                i, i
            )
        })
        .collect()
}

/// Benchmark tabular results decoding
fn bench_results_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("results_decode");

    for size in [100, 1000, 10_000].iter() {
        let payload = results_payload(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut response = parse_bytes(
                    "application/sparql-results+json",
                    payload.clone(),
                    &WireConfig::default(),
                )
                .unwrap();
                response.rows().unwrap().filter_map(Result::ok).count()
            });
        });
    }
    group.finish();
}

/// Benchmark N-Triples decoding
fn bench_ntriples_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("ntriples_decode");

    for size in [100, 1000, 10_000].iter() {
        let payload = ntriples_payload(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut response =
                    parse_bytes("application/n-triples", payload.clone(), &WireConfig::default())
                        .unwrap();
                response.rows().unwrap().filter_map(Result::ok).count()
            });
        });
    }
    group.finish();
}

/// Benchmark cell coercion
fn bench_coercion(c: &mut Criterion) {
    let int = Node::Literal(Literal::new("123456", "http://www.w3.org/2001/XMLSchema#int"));
    let stamp = Node::Literal(Literal::new(
        "2024-03-01T10:15:30.25+02:00",
        "http://www.w3.org/2001/XMLSchema#dateTime",
    ));

    c.bench_function("coerce_i32", |b| {
        b.iter(|| coerce::to_i32(Some(&int), 0).unwrap())
    });
    c.bench_function("coerce_offset_date_time", |b| {
        b.iter(|| coerce::to_offset_date_time(Some(&stamp)).unwrap())
    });
    c.bench_function("canonical_text_round_trip", |b| {
        b.iter(|| stamp.to_string().parse::<Node>().unwrap())
    });
}

criterion_group!(
    benches,
    bench_results_decode,
    bench_ntriples_decode,
    bench_coercion,
);
criterion_main!(benches);
