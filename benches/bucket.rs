#[macro_use]
extern crate criterion;
extern crate cuckoof;
extern crate rand;

use criterion::Criterion;
use cuckoof::{Bucket, FieldLayout, PackedLayout};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn layouts() -> Vec<(&'static str, PackedLayout)> {
    vec![
        ("plain-15x4", PackedLayout::new(FieldLayout::default()).unwrap()),
        ("plain-8x7", PackedLayout::new(FieldLayout::plain(8, 7).unwrap()).unwrap()),
        ("counting-12x4", PackedLayout::new(FieldLayout::counting(12, 3).unwrap()).unwrap()),
    ]
}

fn contains(c: &mut Criterion) {
    let mut group = c.benchmark_group("Bucket");
    let mut rng = rand::thread_rng();

    for (name, layout) in layouts() {
        let mut bucket = Bucket::default();
        while bucket.place(rng.gen::<u32>() & layout.fingerprint_mask(), 1, &layout) {}
        group.bench_function(format!("contains-{}", name), |b| {
            let fingerprint = rng.gen::<u32>() & layout.fingerprint_mask();
            b.iter(|| bucket.contains(fingerprint, &layout));
        });
    }
}

fn swap(c: &mut Criterion) {
    let mut group = c.benchmark_group("Bucket");
    let mut rng = StdRng::seed_from_u64(0);

    for (name, layout) in layouts() {
        let mut bucket = Bucket::default();
        for fingerprint in 0.. {
            if !bucket.place(fingerprint, 1, &layout) {
                break;
            }
        }
        group.bench_function(format!("swap-{}", name), |b| {
            b.iter(|| bucket.swap_random_occupied(7, 1, &layout, &mut rng));
        });
    }
}

criterion_group!(bucket, contains, swap);
criterion_main!(bucket);
