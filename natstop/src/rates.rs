//! Per-second throughput derived from two cumulative-counter captures.

use std::time::Duration;

use crate::types::Counters;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateSample {
    pub in_msgs_per_sec: f64,
    pub out_msgs_per_sec: f64,
    pub in_bytes_per_sec: f64,
    pub out_bytes_per_sec: f64,
}

impl RateSample {
    pub const ZERO: RateSample = RateSample {
        in_msgs_per_sec: 0.0,
        out_msgs_per_sec: 0.0,
        in_bytes_per_sec: 0.0,
        out_bytes_per_sec: 0.0,
    };
}

/// Rates between `prev` and `curr` over `elapsed`.
///
/// A counter that went backwards (server restart) contributes 0 for the interval.
/// A zero elapsed time yields the zero sample.
pub fn rate(prev: &Counters, curr: &Counters, elapsed: Duration) -> RateSample {
    let dt = elapsed.as_secs_f64();
    if dt <= 0.0 {
        return RateSample::ZERO;
    }
    let per_sec = |p: u64, c: u64| c.saturating_sub(p) as f64 / dt;
    RateSample {
        in_msgs_per_sec: per_sec(prev.in_msgs, curr.in_msgs),
        out_msgs_per_sec: per_sec(prev.out_msgs, curr.out_msgs),
        in_bytes_per_sec: per_sec(prev.in_bytes, curr.in_bytes),
        out_bytes_per_sec: per_sec(prev.out_bytes, curr.out_bytes),
    }
}
