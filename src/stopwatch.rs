use std::time::Instant;

use tdigest::TDigest;

pub type UserDurationMicros = (String, f64);

/// Collects per-model-fit wall clock durations and reports latency
/// percentiles over the whole batch.
#[derive(Clone)]
pub struct Stopwatch {
    start_time: Instant,
    fit_durations: Vec<UserDurationMicros>,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Stopwatch {
        Stopwatch {
            start_time: Instant::now(),
            fit_durations: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = Instant::now();
    }

    pub fn stop(&mut self, user_id: &str) {
        let duration_as_micros = self.start_time.elapsed().as_micros() as f64;
        self.record(user_id, duration_as_micros);
    }

    /// Adds a duration measured elsewhere, e.g. on a worker thread.
    pub fn record(&mut self, user_id: &str, duration_as_micros: f64) {
        self.fit_durations
            .push((user_id.to_string(), duration_as_micros));
    }

    pub fn get_n(&self) -> usize {
        self.fit_durations.len()
    }

    pub fn get_percentile_in_micros(&self, q: f64) -> f64 {
        let t_digest = TDigest::new_with_size(100);
        let durations = self
            .fit_durations
            .iter()
            .map(|(_, duration)| *duration)
            .collect();
        let sorted_digest = t_digest.merge_unsorted(durations);
        sorted_digest.estimate_quantile(q)
    }
}

#[cfg(test)]
mod stopwatch_test {
    use super::*;

    #[test]
    fn should_report_percentiles_over_recorded_durations() {
        let mut stopwatch = Stopwatch::new();
        for duration in 1..=100 {
            stopwatch.record("IPA1", duration as f64);
        }
        assert_eq!(100, stopwatch.get_n());
        let p50 = stopwatch.get_percentile_in_micros(0.5);
        assert!((40.0..=60.0).contains(&p50));
        let p99 = stopwatch.get_percentile_in_micros(0.99);
        assert!(p99 >= p50);
    }
}
