// Prints the insertion failure rate of a cuckoo filter per load-factor window.
//
//   cargo run --release --bin load_curve -- 8 4
//
// Arguments are the fingerprint width and slots per bucket (default 15 4).

extern crate cuckoof;
extern crate rand;

use cuckoof::{CuckooFilter, FieldLayout};
use rand::Rng;

const NUM_BUCKETS: usize = 1 << 16;
const TRIALS: usize = 10;
const WINDOWS: usize = 20;

fn main() {
    let args: Vec<u32> = std::env::args()
        .skip(1)
        .map(|a| a.parse().expect("Expected numeric arguments"))
        .collect();
    let (fingerprint_bits, slots) = match args.as_slice() {
        [] => (15, 4),
        [f, s] => (*f, *s),
        _ => panic!("Expected <fingerprint bits> <slots>"),
    };
    let layout = FieldLayout::plain(fingerprint_bits, slots).expect("Invalid layout");

    let capacity = NUM_BUCKETS * slots as usize;
    let mut attempts = [0usize; WINDOWS];
    let mut failures = [0usize; WINDOWS];
    let mut first_failure = Vec::with_capacity(TRIALS);

    for trial in 0..TRIALS {
        let mut filter = CuckooFilter::builder()
            .num_buckets(NUM_BUCKETS)
            .layout(layout)
            .seed(trial as u64)
            .build()
            .expect("Invalid filter");
        let mut rng = rand::thread_rng();
        let mut failed = false;

        for _ in 0..capacity {
            let window = ((filter.load_factor() * WINDOWS as f64) as usize).min(WINDOWS - 1);
            attempts[window] += 1;
            if !filter.insert(rng.gen::<u64>()).unwrap() {
                failures[window] += 1;
                if !failed {
                    first_failure.push(filter.load_factor());
                    failed = true;
                }
            }
        }
    }

    println!("load\tattempts\tfailure rate");
    for window in 0..WINDOWS {
        if attempts[window] == 0 {
            continue;
        }
        println!(
            "{:.2}\t{}\t{:.6}",
            window as f64 / WINDOWS as f64,
            attempts[window],
            failures[window] as f64 / attempts[window] as f64
        );
    }
    if !first_failure.is_empty() {
        let mean = first_failure.iter().sum::<f64>() / first_failure.len() as f64;
        println!("mean load at first failure: {:.4}", mean);
    }
}
