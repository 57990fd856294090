//! Throughput estimation from cumulative counters.
//!
//! State machine with a single slot:
//! 1. No sample yet: the current counters become the baseline, rate is zero.
//! 2. Sample present: diff against it, divide by the elapsed time (floored at
//!    [`MIN_ELAPSED`]), round to 2 decimals, replace the sample.
//!
//! The estimator never retries; a failed counter read leaves the stored sample
//! untouched and is returned to the caller.

use std::time::{Duration, Instant};

use crate::counters::{CounterError, CounterSource, NetCounters, SystemCounters};
use crate::units::{RateReading, RateUnit, round2};

/// Lower bound on the interval used as divisor, so back-to-back calls do not
/// blow the rate up.
pub const MIN_ELAPSED: Duration = Duration::from_millis(100);

/// The last observed counters and when they were read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub timestamp: Instant,
}

/// Stateful B/s estimator over a [`CounterSource`].
pub struct RateEstimator {
    source: Box<dyn CounterSource>,
    last: Option<Sample>,
}

impl RateEstimator {
    pub fn new(source: impl CounterSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            last: None,
        }
    }

    /// Estimator over the running kernel's counters.
    pub fn system() -> Self {
        Self::new(SystemCounters)
    }

    /// Read the counters now and advance the state machine.
    pub fn estimate(&mut self) -> Result<RateReading, CounterError> {
        let counters = self.source.read()?;
        Ok(self.observe(counters, Instant::now()))
    }

    /// Take the baseline sample ahead of the first real request.
    ///
    /// Failures are logged, not returned: the first request will simply
    /// establish the baseline instead.
    pub fn prime(&mut self) {
        if let Err(e) = self.estimate() {
            log::warn!("could not take baseline sample: {e}");
        }
    }

    /// Advance the state machine with counters observed at `now`.
    pub fn observe(&mut self, counters: NetCounters, now: Instant) -> RateReading {
        let Some(last) = self.last else {
            self.last = Some(Sample {
                bytes_sent: counters.bytes_sent,
                bytes_received: counters.bytes_received,
                timestamp: now,
            });
            return RateReading::zero();
        };

        let elapsed = now
            .saturating_duration_since(last.timestamp)
            .max(MIN_ELAPSED)
            .as_secs_f64();
        let incoming = (counters.bytes_received as f64 - last.bytes_received as f64) / elapsed;
        let outgoing = (counters.bytes_sent as f64 - last.bytes_sent as f64) / elapsed;

        self.last = Some(Sample {
            bytes_sent: counters.bytes_sent,
            bytes_received: counters.bytes_received,
            timestamp: now.max(last.timestamp),
        });

        RateReading {
            incoming: round2(incoming),
            outgoing: round2(outgoing),
            unit: RateUnit::BytesPerSec,
        }
    }

    /// The current baseline, if one has been taken.
    pub fn last_sample(&self) -> Option<&Sample> {
        self.last.as_ref()
    }
}

impl std::fmt::Debug for RateEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateEstimator")
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}
