#[macro_use]
extern crate criterion;
extern crate cuckoof;
extern crate rand;

use criterion::{BenchmarkId, Criterion};
use cuckoof::{CuckooFilter, FieldLayout, HashFunction};
use rand::Rng;

const SAMPLE_SIZE: usize = 500_000;

fn filled(hash_function: HashFunction, keys: &[u64]) -> CuckooFilter {
    let mut filter = CuckooFilter::builder()
        .num_buckets((SAMPLE_SIZE / 4).next_power_of_two())
        .hash_function(hash_function)
        .seed(1)
        .build()
        .unwrap();
    for key in keys {
        filter.insert(*key).unwrap();
    }
    filter
}

fn insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("CuckooFilter");
    let group = group.sample_size(10);

    let mut rng = rand::thread_rng();
    let keys: Vec<u64> = (0..SAMPLE_SIZE).map(|_| rng.gen()).collect();

    group.bench_with_input(BenchmarkId::new("insert", SAMPLE_SIZE), &keys, |b, keys| {
        b.iter(|| filled(HashFunction::Murmur3, keys));
    });
}

fn lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("CuckooFilter");

    let mut rng = rand::thread_rng();
    let keys: Vec<u64> = (0..SAMPLE_SIZE).map(|_| rng.gen()).collect();

    for hash_function in HashFunction::ALL {
        let filter = filled(hash_function, &keys);
        let id = format!("lookup-{:?}", hash_function);
        group.bench_function(BenchmarkId::new(id, SAMPLE_SIZE), |b| {
            let key: u64 = rng.gen();
            b.iter(|| filter.lookup(key).unwrap());
        });
    }
}

fn counting(c: &mut Criterion) {
    let mut group = c.benchmark_group("CuckooFilter");

    let mut filter = CuckooFilter::builder()
        .layout(FieldLayout::counting(12, 3).unwrap())
        .seed(1)
        .build()
        .unwrap();
    filter.insert("hot").unwrap();

    group.bench_function("insert-decrement-counting", |b| {
        b.iter(|| {
            filter.insert("hot").unwrap();
            filter.decrement("hot").unwrap()
        });
    });
}

fn serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("CuckooFilter");
    let group = group.sample_size(10);

    let mut rng = rand::thread_rng();
    let keys: Vec<u64> = (0..SAMPLE_SIZE).map(|_| rng.gen()).collect();
    let filter = filled(HashFunction::XxHash, &keys);

    group.bench_with_input(
        BenchmarkId::new("bincode-serialize", SAMPLE_SIZE),
        &filter,
        |b, filter| {
            b.iter(|| filter.to_bytes().unwrap());
        },
    );

    let bytes = filter.to_bytes().unwrap();

    group.bench_with_input(
        BenchmarkId::new("bincode-deserialize", SAMPLE_SIZE),
        &bytes,
        |b, bytes| {
            b.iter(|| CuckooFilter::from_bytes(bytes).unwrap());
        },
    );
}

criterion_group!(cuckoo, insert, lookup, counting, serialization);
criterion_main!(cuckoo);
