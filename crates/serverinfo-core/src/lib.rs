//! # serverinfo-core
//!
//! **nload for a fleet of hosts.**
//!
//! `serverinfo-core` holds the pieces shared by the speed server and the
//! monitoring client: reading the kernel's cumulative network counters,
//! turning them into a throughput estimate, scaling and formatting rates, and
//! the flat-file registry of servers the client polls.
//!
//! ## Quick Start
//!
//! ```no_run
//! use serverinfo_core::{RateEstimator, format_speed};
//!
//! let mut estimator = RateEstimator::system();
//!
//! // The first call only records a baseline and reports zero.
//! estimator.prime();
//! std::thread::sleep(std::time::Duration::from_secs(1));
//!
//! let reading = estimator.estimate().expect("counters readable");
//! println!("in {}  out {}", format_speed(reading.incoming), format_speed(reading.outgoing));
//! ```
//!
//! ## Architecture
//!
//! OS counters → [`CounterSource`] → [`RateEstimator`] → [`RateReading`]
//!
//! Every counter backend implements the [`CounterSource`] trait. The estimator
//! keeps exactly one previous [`Sample`] and diffs each fresh read against it.

pub mod counters;
pub mod estimator;
pub mod format;
pub mod registry;
pub mod units;

pub use counters::{CounterError, CounterSource, NetCounters, SysinfoCounters, SystemCounters};
pub use estimator::{MIN_ELAPSED, RateEstimator, Sample};
pub use format::format_speed;
pub use registry::{AddOutcome, RemoveOutcome, TargetList, default_config_path};
pub use units::{RateReading, RateUnit};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Port the speed server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 8765;

/// Target polled when no registry file exists yet.
pub const DEFAULT_TARGET: &str = "http://localhost:8765";
