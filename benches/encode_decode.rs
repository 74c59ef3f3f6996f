use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use imprint::{compose, project, Builder, CompositionOptions, ProjectionOptions, Reader, Value};

fn build_record(field_count: u32) -> Vec<u8> {
    let mut builder = Builder::new();
    for id in 0..field_count {
        builder.set(id, Value::Int64(id as i64)).unwrap();
    }
    builder.finalize(1, 0xfeed).unwrap()
}

fn bench_finalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder_finalize");
    for &field_count in &[8u32, 64, 512] {
        group.bench_with_input(
            BenchmarkId::from_parameter(field_count),
            &field_count,
            |b, &field_count| {
                b.iter(|| {
                    let mut builder = Builder::new();
                    for id in 0..field_count {
                        builder.set(id, Value::Int64(id as i64)).unwrap();
                    }
                    black_box(builder.finalize(1, 0).unwrap())
                });
            },
        );
    }
    group.finish();
}

fn bench_field_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("reader_get_value");
    for &field_count in &[8u32, 64, 512] {
        let bytes = build_record(field_count);
        group.bench_with_input(
            BenchmarkId::from_parameter(field_count),
            &bytes,
            |b, bytes| {
                let reader = Reader::new(bytes).unwrap();
                let target = field_count / 2;
                b.iter(|| black_box(reader.get_value(target).unwrap()));
            },
        );
    }
    group.finish();
}

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("project");
    for &field_count in &[8u32, 64, 512] {
        let bytes = build_record(field_count);
        let wanted: Vec<u32> = (0..field_count).step_by(4).collect();
        group.bench_with_input(
            BenchmarkId::from_parameter(field_count),
            &(bytes, wanted),
            |b, (bytes, wanted)| {
                b.iter(|| black_box(project(bytes, wanted, ProjectionOptions::default()).unwrap()));
            },
        );
    }
    group.finish();
}

fn bench_composition(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose");
    for &field_count in &[8u32, 64, 512] {
        let a = build_record(field_count);
        let mut builder = Builder::new();
        for id in field_count..field_count * 2 {
            builder.set(id, Value::Int64(id as i64)).unwrap();
        }
        let b_bytes = builder.finalize(1, 0).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(field_count),
            &(a, b_bytes),
            |bencher, (a, b)| {
                bencher.iter(|| black_box(compose(a, b, CompositionOptions::default()).unwrap()));
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_finalize,
    bench_field_lookup,
    bench_projection,
    bench_composition
);
criterion_main!(benches);
