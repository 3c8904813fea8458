use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ksm::prelude::*;
use ksm::protocol::{decode_records, encode_records};

#[path = "../tests/common/mod.rs"]
mod common;

use common::{fixture_credentials, Client, SPC1};

fn bench_tllv_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("tllv");

    for count in [8usize, 64, 512] {
        let records: Vec<TllvRecord> = (0..count)
            .map(|i| TllvRecord::with_padding(Tag(i as u64), vec![0xab; 21], vec![0; 27]).unwrap())
            .collect();
        let stream = encode_records(&records).unwrap();
        group.throughput(Throughput::Bytes(stream.len() as u64));

        group.bench_with_input(BenchmarkId::new("decode", count), &stream, |b, stream| {
            b.iter(|| decode_records(black_box(stream)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("encode", count), &records, |b, records| {
            b.iter(|| encode_records(black_box(records)).unwrap())
        });
    }

    group.finish();
}

fn bench_exchange(c: &mut Criterion) {
    let credentials = fixture_credentials();
    let client = Client::new(&credentials);
    let spc = client.spc();
    let ksm = Ksm::new(credentials);
    let parsed = ksm.parse_spc(&spc).unwrap();
    let provider = FixedContentKey::new(ContentKey::new([0x11; 16], [0x22; 16]));

    let mut group = c.benchmark_group("exchange");
    group.bench_function("parse_fixture_spc", |b| {
        b.iter(|| ksm.parse_spc(black_box(SPC1)).unwrap())
    });
    group.bench_function("parse_spc", |b| b.iter(|| ksm.parse_spc(black_box(&spc)).unwrap()));
    group.bench_function("build_ckc", |b| {
        b.iter(|| ksm.build_ckc(black_box(&parsed), &provider).unwrap())
    });
    group.bench_function("generate_ckc", |b| {
        b.iter(|| ksm.generate_ckc(black_box(&spc), &provider).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_tllv_codec, bench_exchange);
criterion_main!(benches);
