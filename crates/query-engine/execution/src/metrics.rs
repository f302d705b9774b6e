//! Metrics setup and update for query execution.

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

/// Counters updated by every execution.
#[derive(Debug, Clone)]
pub struct Metrics {
    query_total: IntCounter,
    update_total: IntCounter,
    batch_total: IntCounter,
    failure_total: IntCounterVec,
}

impl Metrics {
    /// Set up counters and register them with the provided Prometheus Registry.
    pub fn initialize(metrics_registry: &mut Registry) -> Result<Self, prometheus::Error> {
        let query_total = add_int_counter_metric(
            metrics_registry,
            "query_util_query_total",
            "Total successful reads.",
        )?;

        let update_total = add_int_counter_metric(
            metrics_registry,
            "query_util_update_total",
            "Total successful writes.",
        )?;

        let batch_total = add_int_counter_metric(
            metrics_registry,
            "query_util_batch_total",
            "Total successful batches.",
        )?;

        let failure_total = IntCounterVec::new(
            Opts::new(
                "query_util_failure_total",
                "Total failed executions, by kind of failure.",
            ),
            &["kind"],
        )?;
        metrics_registry.register(Box::new(failure_total.clone()))?;

        Ok(Self {
            query_total,
            update_total,
            batch_total,
            failure_total,
        })
    }

    pub fn record_query(&self) {
        self.query_total.inc();
    }

    pub fn record_update(&self) {
        self.update_total.inc();
    }

    pub fn record_batch(&self) {
        self.batch_total.inc();
    }

    pub fn record_failure(&self, kind: &str) {
        self.failure_total.with_label_values(&[kind]).inc();
    }

    pub fn query_total(&self) -> u64 {
        self.query_total.get()
    }

    pub fn update_total(&self) -> u64 {
        self.update_total.get()
    }

    pub fn batch_total(&self) -> u64 {
        self.batch_total.get()
    }

    pub fn failure_total(&self, kind: &str) -> u64 {
        self.failure_total.with_label_values(&[kind]).get()
    }
}

/// Create a new int counter metric and register it with the provided Prometheus Registry
fn add_int_counter_metric(
    metrics_registry: &mut Registry,
    metric_name: &str,
    metric_description: &str,
) -> Result<IntCounter, prometheus::Error> {
    let int_counter = IntCounter::with_opts(Opts::new(metric_name, metric_description))?;
    metrics_registry.register(Box::new(int_counter.clone()))?;
    Ok(int_counter)
}
