//! Sample flow metrics
//!
//! Counters are exported through the `metrics` facade; `ArrivalStats` keeps an
//! in-memory summary for the monitor.

use std::time::Duration;

use metrics::counter;

/// A sample left through a sink
pub fn record_sample_published(sink: &str) {
    counter!("tactile_samples_published_total", "sink" => sink.to_string()).increment(1);
}

/// A sample arrived at a source
pub fn record_sample_received(source: &str) {
    counter!("tactile_samples_received_total", "source" => source.to_string()).increment(1);
}

/// A relay filter dropped a sample
pub fn record_sample_filtered(filter: &str) {
    counter!("tactile_samples_filtered_total", "filter" => filter.to_string()).increment(1);
}

/// A trace pass completed and playback restarted
pub fn record_trace_loop(sink: &str) {
    counter!("tactile_trace_loops_total", "sink" => sink.to_string()).increment(1);
}

/// A slow subscriber skipped `missed` samples
pub fn record_subscriber_lagged(endpoint: &str, missed: u64) {
    counter!("tactile_subscriber_lagged_total", "endpoint" => endpoint.to_string())
        .increment(missed);
}

/// Arrival statistics for one watched stream
#[derive(Debug, Clone, Default)]
pub struct ArrivalStats {
    /// Messages received
    pub messages: u64,

    /// Payloads that did not decode
    pub malformed: u64,

    /// Gap between consecutive arrivals (ms)
    pub interval_ms: RunningStats,

    /// Gap between consecutive sample timestamps (ms)
    pub timestamp_step_ms: RunningStats,

    last_timestamp: Option<f64>,
}

impl ArrivalStats {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one arrival
    ///
    /// `since_last` is the wall gap to the previous arrival, `timestamp` the
    /// sample's own clock when it has one.
    pub fn record(&mut self, since_last: Option<Duration>, timestamp: Option<f64>) {
        self.messages += 1;

        if let Some(gap) = since_last {
            self.interval_ms.push(gap.as_secs_f64() * 1000.0);
        }

        if let Some(ts) = timestamp {
            // A step backwards is a trace loop, not a gap
            if let Some(prev) = self.last_timestamp.filter(|prev| ts >= *prev) {
                self.timestamp_step_ms.push((ts - prev) * 1000.0);
            }
            self.last_timestamp = Some(ts);
        }
    }

    /// Record an undecodable payload
    pub fn record_malformed(&mut self) {
        self.messages += 1;
        self.malformed += 1;
    }

    /// Observed message rate over `elapsed`
    pub fn rate_hz(&self, elapsed: Duration) -> f64 {
        if elapsed.as_secs_f64() > 0.0 {
            self.messages as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl std::fmt::Display for ArrivalStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Messages: {}", self.messages)?;
        writeln!(f, "Malformed: {}", self.malformed)?;
        writeln!(
            f,
            "Arrival interval (ms): {}",
            StatsSummary::from(&self.interval_ms)
        )?;
        write!(
            f,
            "Timestamp step (ms): {}",
            StatsSummary::from(&self.timestamp_step_ms)
        )
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_arrival_stats_skips_loop_boundary() {
        let mut stats = ArrivalStats::new();
        stats.record(None, Some(0.0));
        stats.record(Some(Duration::from_millis(10)), Some(0.01));
        stats.record(Some(Duration::from_millis(10)), Some(0.0));
        stats.record(Some(Duration::from_millis(10)), Some(0.01));

        assert_eq!(stats.messages, 4);
        assert_eq!(stats.interval_ms.count(), 3);
        assert_eq!(stats.timestamp_step_ms.count(), 2);
        assert!((stats.timestamp_step_ms.mean() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_arrival_rate() {
        let mut stats = ArrivalStats::new();
        for _ in 0..50 {
            stats.record(None, None);
        }
        assert!((stats.rate_hz(Duration::from_secs(5)) - 10.0).abs() < 1e-12);
        assert_eq!(stats.rate_hz(Duration::ZERO), 0.0);
    }

    #[test]
    fn test_summary_display() {
        let summary = StatsSummary {
            count: 100,
            min: 9.5,
            max: 11.0,
            mean: 10.0,
            std_dev: 0.2,
        };

        let output = format!("{}", summary);
        assert!(output.contains("mean=10.000"));
        assert!(output.contains("n=100"));
        assert_eq!(format!("{}", StatsSummary::default()), "N/A");
    }
}
