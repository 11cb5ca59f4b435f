//! Running counters and timing statistics

use std::time::Duration;

use serde::Serialize;

use crate::config::DEFAULT_LATENCY_SMOOTHING;

/// Point-in-time copy of the engine statistics.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub generated_count: u64,
    pub validated_count: u64,
    pub error_count: u64,
    /// Exponentially weighted moving average of single-UUID generation time
    pub average_latency_ms: f64,
    /// Highest UUIDs-per-second rate observed over a whole batch
    pub peak_rate_per_sec: f64,
}

/// Statistics accumulator.
#[derive(Clone, Debug)]
pub struct Stats {
    current: StatsSnapshot,
    smoothing: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY_SMOOTHING)
    }
}

impl Stats {
    /// Creates an accumulator whose moving average weights the newest sample by `smoothing`.
    pub fn new(smoothing: f64) -> Self {
        Self {
            current: StatsSnapshot::default(),
            smoothing,
        }
    }

    pub fn record_generation(&mut self, elapsed: Duration) {
        let sample = elapsed.as_secs_f64() * 1_000.0;
        let avg = &mut self.current.average_latency_ms;
        *avg = if self.current.generated_count == 0 {
            sample
        } else {
            *avg * (1.0 - self.smoothing) + sample * self.smoothing
        };
        self.current.generated_count += 1;
    }

    pub fn record_validation(&mut self, is_valid: bool) {
        self.current.validated_count += 1;
        if !is_valid {
            self.current.error_count += 1;
        }
    }

    pub fn record_error(&mut self) {
        self.current.error_count += 1;
    }

    /// Raises the peak-rate watermark if the batch beat it.
    pub fn record_batch(&mut self, count: usize, elapsed: Duration) {
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            let rate = count as f64 / secs;
            if rate > self.current.peak_rate_per_sec {
                self.current.peak_rate_per_sec = rate;
            }
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = StatsSnapshot::default();
    }
}

#[cfg(test)]
mod tests {
    use super::Stats;
    use std::time::Duration;

    /// Seeds moving average with first sample
    #[test]
    fn seeds_moving_average_with_first_sample() {
        let mut s = Stats::new(0.1);
        s.record_generation(Duration::from_millis(10));
        assert_eq!(s.snapshot().average_latency_ms, 10.0);
        s.record_generation(Duration::from_millis(20));
        assert!((s.snapshot().average_latency_ms - 11.0).abs() < 1e-9);
        assert_eq!(s.snapshot().generated_count, 2);
    }

    /// Keeps only highest batch rate
    #[test]
    fn keeps_only_highest_batch_rate() {
        let mut s = Stats::default();
        s.record_batch(1_000, Duration::from_secs(2));
        assert_eq!(s.snapshot().peak_rate_per_sec, 500.0);
        s.record_batch(100, Duration::from_secs(1));
        assert_eq!(s.snapshot().peak_rate_per_sec, 500.0);
        s.record_batch(1_000, Duration::from_millis(500));
        assert_eq!(s.snapshot().peak_rate_per_sec, 2_000.0);
        s.record_batch(1_000, Duration::ZERO);
        assert_eq!(s.snapshot().peak_rate_per_sec, 2_000.0);
    }

    /// Counts validations and errors
    #[test]
    fn counts_validations_and_errors() {
        let mut s = Stats::default();
        s.record_validation(true);
        s.record_validation(false);
        s.record_error();
        let snap = s.snapshot();
        assert_eq!(snap.validated_count, 2);
        assert_eq!(snap.error_count, 2);
    }

    /// Resets all counters
    #[test]
    fn resets_all_counters() {
        let mut s = Stats::default();
        s.record_generation(Duration::from_millis(1));
        s.record_batch(1, Duration::from_millis(1));
        s.record_error();
        s.reset();
        assert_eq!(s.snapshot(), Default::default());
    }
}
