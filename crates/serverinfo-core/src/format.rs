//! Human-readable throughput strings.

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;

/// Format a bytes-per-second value with a binary-scaled unit.
///
/// Negative and non-finite inputs have no meaningful rendering and come back
/// as `"N/A"`.
pub fn format_speed(bps: f64) -> String {
    if !bps.is_finite() || bps < 0.0 {
        return "N/A".to_string();
    }
    if bps >= GIB {
        format!("{:.2} GB/s", bps / GIB)
    } else if bps >= MIB {
        format!("{:.2} MB/s", bps / MIB)
    } else if bps >= KIB {
        format!("{:.2} KB/s", bps / KIB)
    } else {
        format!("{bps:.1} B/s")
    }
}
