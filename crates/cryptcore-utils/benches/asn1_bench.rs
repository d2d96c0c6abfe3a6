//! ASN.1 codec benchmarks.
//!
//! Run with: cargo bench -p cryptcore-utils

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cryptcore_utils::asn1::{Builder, Parser};

/// An RSAPrivateKey-shaped structure with `bits`-sized components.
fn sample_key(bits: usize) -> Builder {
    let n: Vec<u8> = (0..bits / 8).map(|i| (i as u8) | 0x80).collect();
    let half: Vec<u8> = n[..n.len() / 2].to_vec();
    let mut b = Builder::new();
    b.add_int32(0)
        .add_big_int(&n)
        .add_big_int(&[0x01, 0x00, 0x01])
        .add_big_int(&n)
        .add_big_int(&half)
        .add_big_int(&half)
        .add_big_int(&half)
        .add_big_int(&half)
        .add_big_int(&half);
    b
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("asn1-encode");
    for bits in [1024usize, 4096] {
        let key = sample_key(bits);
        group.throughput(Throughput::Bytes(key.encoded_len() as u64));
        group.bench_with_input(BenchmarkId::new("rsa-private-key", bits), &bits, |b, _| {
            b.iter(|| key.to_der());
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("asn1-decode");
    for bits in [1024usize, 4096] {
        let der = sample_key(bits).to_der();
        group.throughput(Throughput::Bytes(der.len() as u64));
        group.bench_with_input(BenchmarkId::new("rsa-private-key", bits), &bits, |b, _| {
            b.iter(|| {
                let mut seq = Parser::new(&der).get_sequence().unwrap();
                let version = seq.get_int32().unwrap();
                let mut parts = Vec::with_capacity(8);
                while !seq.is_empty() {
                    parts.push(seq.get_big_int().unwrap());
                }
                (version, parts)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
