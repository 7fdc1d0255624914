//! Scoring metrics and periodic reporting for the credit risk pipeline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

use crate::types::RiskLabel;

/// In-process metrics for the scoring loop.
pub struct ScoringMetrics {
    /// Total applicants scored
    pub applicants_scored: AtomicU64,
    /// High-risk decisions
    pub high_risk_decisions: AtomicU64,
    /// Low-risk decisions
    pub low_risk_decisions: AtomicU64,
    /// Requests that failed in transform/predict
    pub pipeline_failures: AtomicU64,
    /// Payloads that failed to deserialize
    pub malformed_requests: AtomicU64,
    /// Scoring latencies in microseconds
    latencies: RwLock<Vec<u64>>,
    /// Probability distribution buckets, 0.0-0.1 through 0.9-1.0
    probability_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ScoringMetrics {
    pub fn new() -> Self {
        Self {
            applicants_scored: AtomicU64::new(0),
            high_risk_decisions: AtomicU64::new(0),
            low_risk_decisions: AtomicU64::new(0),
            pipeline_failures: AtomicU64::new(0),
            malformed_requests: AtomicU64::new(0),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record one scored applicant.
    pub fn record_scoring(&self, latency: Duration, probability: f64, label: RiskLabel) {
        self.applicants_scored.fetch_add(1, Ordering::Relaxed);
        match label {
            RiskLabel::HighRisk => self.high_risk_decisions.fetch_add(1, Ordering::Relaxed),
            RiskLabel::LowRisk => self.low_risk_decisions.fetch_add(1, Ordering::Relaxed),
        };

        if let Ok(mut latencies) = self.latencies.write() {
            latencies.push(latency.as_micros() as u64);
            // Bound memory under sustained load
            if latencies.len() > 10_000 {
                latencies.drain(0..5_000);
            }
        }

        let bucket = (probability * 10.0).clamp(0.0, 9.0) as usize;
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a request that failed in the scoring pipeline.
    pub fn record_failure(&self) {
        self.pipeline_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a payload that could not be deserialized.
    pub fn record_malformed(&self) {
        self.malformed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Latency statistics over the retained window.
    pub fn latency_stats(&self) -> LatencyStats {
        let latencies = match self.latencies.read() {
            Ok(l) => l,
            Err(_) => return LatencyStats::default(),
        };
        if latencies.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted: Vec<u64> = latencies.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
        }
    }

    /// Scorings per second since startup.
    pub fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.applicants_scored.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Probability distribution over the ten buckets.
    pub fn probability_distribution(&self) -> [u64; 10] {
        self.probability_buckets
            .read()
            .map(|b| *b)
            .unwrap_or([0; 10])
    }

    /// Log a summary of the current counters.
    pub fn log_summary(&self) {
        let scored = self.applicants_scored.load(Ordering::Relaxed);
        let high = self.high_risk_decisions.load(Ordering::Relaxed);
        let low = self.low_risk_decisions.load(Ordering::Relaxed);
        let failures = self.pipeline_failures.load(Ordering::Relaxed);
        let malformed = self.malformed_requests.load(Ordering::Relaxed);
        let stats = self.latency_stats();
        let high_rate = if scored > 0 {
            (high as f64 / scored as f64) * 100.0
        } else {
            0.0
        };

        info!(
            scored,
            high_risk = high,
            low_risk = low,
            high_risk_rate = format!("{:.1}%", high_rate),
            pipeline_failures = failures,
            malformed_requests = malformed,
            throughput = format!("{:.1}/s", self.throughput()),
            latency_mean_us = stats.mean_us,
            latency_p95_us = stats.p95_us,
            latency_p99_us = stats.p99_us,
            "Scoring metrics summary"
        );
    }
}

impl Default for ScoringMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoring latency statistics
#[derive(Debug, Default)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
}

/// Periodic reporter logging a metrics summary at a fixed interval.
pub struct MetricsReporter {
    metrics: Arc<ScoringMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ScoringMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the reporting loop.
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.log_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = ScoringMetrics::new();

        metrics.record_scoring(Duration::from_micros(120), 0.8, RiskLabel::HighRisk);
        metrics.record_scoring(Duration::from_micros(90), 0.2, RiskLabel::LowRisk);
        metrics.record_failure();
        metrics.record_malformed();

        assert_eq!(metrics.applicants_scored.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.high_risk_decisions.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.low_risk_decisions.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.pipeline_failures.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.malformed_requests.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_probability_buckets() {
        let metrics = ScoringMetrics::new();

        metrics.record_scoring(Duration::from_micros(100), 0.05, RiskLabel::LowRisk);
        metrics.record_scoring(Duration::from_micros(100), 0.95, RiskLabel::HighRisk);
        metrics.record_scoring(Duration::from_micros(100), 1.0, RiskLabel::HighRisk);

        let buckets = metrics.probability_distribution();
        assert_eq!(buckets[0], 1);
        assert_eq!(buckets[9], 2); // 1.0 clamps into the top bucket
    }

    #[test]
    fn test_latency_stats() {
        let metrics = ScoringMetrics::new();
        for us in [100, 200, 300, 400] {
            metrics.record_scoring(Duration::from_micros(us), 0.5, RiskLabel::HighRisk);
        }

        let stats = metrics.latency_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_us, 250);
        assert!(stats.p50_us >= 200);
    }
}
