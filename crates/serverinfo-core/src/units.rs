//! Rate units and the reading the speed endpoints serialise.

use serde::{Deserialize, Serialize};

/// Unit a [`RateReading`] is expressed in. Binary multiples (1 KB = 1024 B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RateUnit {
    #[default]
    #[serde(rename = "B/s")]
    BytesPerSec,
    #[serde(rename = "KB/s")]
    KiloBytesPerSec,
    #[serde(rename = "MB/s")]
    MegaBytesPerSec,
}

impl RateUnit {
    /// Bytes per second represented by one of this unit.
    pub fn factor(self) -> f64 {
        match self {
            Self::BytesPerSec => 1.0,
            Self::KiloBytesPerSec => 1024.0,
            Self::MegaBytesPerSec => 1024.0 * 1024.0,
        }
    }

    /// Endpoint path serving readings in this unit.
    pub fn path(self) -> &'static str {
        match self {
            Self::BytesPerSec => "/speed",
            Self::KiloBytesPerSec => "/speed/kb",
            Self::MegaBytesPerSec => "/speed/mb",
        }
    }

    /// Convert a value in this unit back to bytes per second.
    pub fn to_bytes_per_sec(self, value: f64) -> f64 {
        value * self.factor()
    }
}

impl std::fmt::Display for RateUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BytesPerSec => write!(f, "B/s"),
            Self::KiloBytesPerSec => write!(f, "KB/s"),
            Self::MegaBytesPerSec => write!(f, "MB/s"),
        }
    }
}

/// Incoming/outgoing throughput in a given unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateReading {
    pub incoming: f64,
    pub outgoing: f64,
    pub unit: RateUnit,
}

impl RateReading {
    pub fn zero() -> Self {
        Self {
            incoming: 0.0,
            outgoing: 0.0,
            unit: RateUnit::BytesPerSec,
        }
    }

    /// Re-express this reading in `unit`, rounded to 2 decimals.
    pub fn scaled(&self, unit: RateUnit) -> Self {
        let ratio = self.unit.factor() / unit.factor();
        Self {
            incoming: round2(self.incoming * ratio),
            outgoing: round2(self.outgoing * ratio),
            unit,
        }
    }
}

/// Round to 2 decimal places.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
