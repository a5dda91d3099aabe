// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The metrics collector: a `prometheus::Registry` plus the counters and
//! histograms it owns. One collector is meant to live for the lifetime of
//! a process and be shared (via `Arc`) across the pipes and bucket clients
//! instrumented with it.

use prometheus::{Counter, CounterVec, Histogram, HistogramOpts, Opts, Registry};

pub struct MetricsCollector {
    registry: Registry,
    pub pipe_starts: CounterVec,
    pub pipe_closes: CounterVec,
    pub pipe_errors: CounterVec,
    pub bucket_writes: Counter,
    pub bucket_retries: Counter,
    pub retry_backoff_seconds: Histogram,
}

impl MetricsCollector {
    pub fn new() -> Self {
        let registry = Registry::new();

        let pipe_starts = CounterVec::new(Opts::new("sluice_pipe_starts_total", "Number of pipes started"), &["kind"]).expect("valid metric");
        let pipe_closes = CounterVec::new(Opts::new("sluice_pipe_closes_total", "Number of pipes closed"), &["kind"]).expect("valid metric");
        let pipe_errors = CounterVec::new(Opts::new("sluice_pipe_errors_total", "Number of pipe failures"), &["kind"]).expect("valid metric");
        let bucket_writes = Counter::new("sluice_bucket_writes_total", "Number of successful bucket writes").expect("valid metric");
        let bucket_retries = Counter::new("sluice_bucket_retries_total", "Number of bucket write retry attempts").expect("valid metric");
        let retry_backoff_seconds =
            Histogram::with_opts(HistogramOpts::new("sluice_retry_backoff_seconds", "Observed retry backoff durations")).expect("valid metric");

        registry.register(Box::new(pipe_starts.clone())).expect("unique metric name");
        registry.register(Box::new(pipe_closes.clone())).expect("unique metric name");
        registry.register(Box::new(pipe_errors.clone())).expect("unique metric name");
        registry.register(Box::new(bucket_writes.clone())).expect("unique metric name");
        registry.register(Box::new(bucket_retries.clone())).expect("unique metric name");
        registry.register(Box::new(retry_backoff_seconds.clone())).expect("unique metric name");

        Self {
            registry,
            pipe_starts,
            pipe_closes,
            pipe_errors,
            bucket_writes,
            bucket_retries,
            retry_backoff_seconds,
        }
    }

    pub fn record_pipe_started(&self, kind: &str) {
        self.pipe_starts.with_label_values(&[kind]).inc();
    }

    pub fn record_pipe_closed(&self, kind: &str) {
        self.pipe_closes.with_label_values(&[kind]).inc();
    }

    pub fn record_pipe_error(&self, kind: &str) {
        self.pipe_errors.with_label_values(&[kind]).inc();
    }

    pub fn record_bucket_write(&self) {
        self.bucket_writes.inc();
    }

    pub fn record_bucket_retry(&self, backoff_secs: f64) {
        self.bucket_retries.inc();
        self.retry_backoff_seconds.observe(backoff_secs);
    }

    /// The underlying registry, for callers that want to gather and
    /// render the metrics themselves.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment_per_label() {
        let collector = MetricsCollector::new();
        collector.record_pipe_started("Filter");
        collector.record_pipe_started("Filter");
        collector.record_pipe_started("Map");
        assert_eq!(collector.pipe_starts.with_label_values(&["Filter"]).get(), 2.0);
        assert_eq!(collector.pipe_starts.with_label_values(&["Map"]).get(), 1.0);
    }

    #[test]
    fn bucket_metrics_track_writes_and_retries() {
        let collector = MetricsCollector::new();
        collector.record_bucket_write();
        collector.record_bucket_retry(0.5);
        assert_eq!(collector.bucket_writes.get(), 1.0);
        assert_eq!(collector.bucket_retries.get(), 1.0);
    }

    #[test]
    fn registry_gathers_registered_families() {
        let collector = MetricsCollector::new();
        collector.record_pipe_started("Filter");
        let families = collector.registry().gather();
        assert!(families.iter().any(|f| f.get_name() == "sluice_pipe_starts_total"));
    }
}
