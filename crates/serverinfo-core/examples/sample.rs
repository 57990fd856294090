//! Print this host's network speed once a second.
//!
//! Run: `cargo run --example sample`

use std::thread;
use std::time::Duration;

use serverinfo_core::{RateEstimator, format_speed};

fn main() {
    let mut estimator = RateEstimator::system();
    estimator.prime();

    for _ in 0..5 {
        thread::sleep(Duration::from_secs(1));
        match estimator.estimate() {
            Ok(r) => println!(
                "in {:>14}   out {:>14}",
                format_speed(r.incoming),
                format_speed(r.outgoing)
            ),
            Err(e) => {
                eprintln!("cannot read counters: {e}");
                return;
            }
        }
    }
}
