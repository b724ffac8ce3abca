use std::time::Duration;

/// Latency distribution of one run. All latencies are in microseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub total: Duration, // wall clock from queue fill to worker drain
    pub throughput: f64, // dispatched requests per second
}

impl Summary {
    /// Sorts `latencies` ascending in place and derives the summary from them.
    ///
    /// Returns `None` when there are no samples. `requests` is the number of
    /// dispatched tickets, which is what throughput is measured against.
    pub fn compute(latencies: &mut [f64], requests: usize, total: Duration) -> Option<Summary> {
        latencies.sort_by(|a, b| a.total_cmp(b));
        Self::from_sorted(latencies, requests, total)
    }

    /// Same as [`Summary::compute`] for input that is already sorted.
    pub fn from_sorted(sorted: &[f64], requests: usize, total: Duration) -> Option<Summary> {
        let (&min, &max) = (sorted.first()?, sorted.last()?);
        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / (count as f64);

        let secs = total.as_secs_f64();
        let throughput = if secs > 0.0 { (requests as f64) / secs } else { 0.0 };

        Some(Summary {
            count,
            min,
            max,
            mean,
            p50: percentile(sorted, 0.50)?,
            p95: percentile(sorted, 0.95)?,
            p99: percentile(sorted, 0.99)?,
            total,
            throughput,
        })
    }
}

/// Nearest-rank percentile: the element at `floor(len * p)`, clamped to the
/// last index. `p` is a fraction in `0.0..=1.0`.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let idx = (((sorted.len() as f64) * p).floor() as usize).min(last);
    sorted.get(idx).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(latencies: &[f64]) -> Option<Summary> {
        let requests = latencies.len();
        Summary::compute(&mut latencies.to_vec(), requests, Duration::from_secs(1))
    }

    #[test]
    fn empty_input_has_no_summary() {
        assert_eq!(summary(&[]), None);
        assert_eq!(percentile(&[], 0.5), None);
    }

    #[test]
    fn single_sample_is_every_statistic() {
        let s = summary(&[420.0]).unwrap();
        assert_eq!(s.count, 1);
        for value in [s.min, s.max, s.mean, s.p50, s.p95, s.p99] {
            assert_eq!(value, 420.0);
        }
    }

    #[test]
    fn percentile_index_is_clamped_for_small_counts() {
        // floor(1 * 0.99) = 0, floor(2 * 0.99) = 1, floor(100 * 0.99) = 99
        assert_eq!(percentile(&[1.0, 2.0], 0.99), Some(2.0));
        assert_eq!(percentile(&[1.0, 2.0, 3.0], 1.0), Some(3.0));

        let hundred: Vec<f64> = (1..=100).map(f64::from).collect();
        assert_eq!(percentile(&hundred, 0.99), Some(100.0));
        assert_eq!(percentile(&hundred, 0.95), Some(96.0));
        assert_eq!(percentile(&hundred, 0.50), Some(51.0));
    }

    #[test]
    fn unsorted_input_is_sorted_before_ranking() {
        let mut latencies = vec![30.0, 10.0, 50.0, 20.0, 40.0];
        let s = Summary::compute(&mut latencies, 5, Duration::from_secs(1)).unwrap();
        assert_eq!(latencies, vec![10.0, 20.0, 30.0, 40.0, 50.0]);
        assert_eq!(s.min, 10.0);
        assert_eq!(s.max, 50.0);
        assert_eq!(s.mean, 30.0);
        assert_eq!(s.p50, 30.0);
        assert_eq!(s.p95, 50.0);
    }

    #[test]
    fn statistics_are_ordered() {
        let mut seed: u64 = 0x2545f4914f6cdd1d;
        for len in [1usize, 2, 3, 7, 19, 100, 1000] {
            let latencies: Vec<f64> = (0..len)
                .map(|_| {
                    seed ^= seed << 13;
                    seed ^= seed >> 7;
                    seed ^= seed << 17;
                    (seed % 100_000) as f64
                })
                .collect();
            let s = summary(&latencies).unwrap();
            assert_eq!(s.count, len);
            assert!(s.min <= s.mean && s.mean <= s.max, "len {}: {:?}", len, s);
            assert!(s.min <= s.p50, "len {}: {:?}", len, s);
            assert!(s.p50 <= s.p95 && s.p95 <= s.p99 && s.p99 <= s.max, "len {}: {:?}", len, s);
        }
    }

    #[test]
    fn recomputing_is_stable() {
        let mut latencies = vec![5.5, 1.25, 9.0, 3.0, 7.75, 2.0];
        let first = Summary::compute(&mut latencies, 6, Duration::from_millis(250)).unwrap();
        let second = Summary::from_sorted(&latencies, 6, Duration::from_millis(250)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn throughput_counts_dispatched_requests() {
        let mut latencies = vec![100.0; 40];
        let s = Summary::compute(&mut latencies, 50, Duration::from_secs(2)).unwrap();
        assert_eq!(s.count, 40);
        assert_eq!(s.throughput, 25.0);
    }
}
