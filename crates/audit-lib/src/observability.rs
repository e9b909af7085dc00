//! Observability infrastructure for the capacity audit
//!
//! Provides:
//! - Prometheus metrics (upstream call latency and outcome, last report values)
//! - Structured logging of audit milestones with tracing

use crate::models::{CapacityReport, Cluster};
use anyhow::{Context, Result};
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, Encoder,
    HistogramVec, IntCounterVec, IntGaugeVec, TextEncoder,
};
use std::sync::OnceLock;
use tracing::info;

/// Histogram buckets for upstream call latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<AuditMetricsInner> = OnceLock::new();

struct AuditMetricsInner {
    api_calls: IntCounterVec,
    api_errors: IntCounterVec,
    api_latency_seconds: HistogramVec,
    tasks: IntGaugeVec,
    hosts: IntGaugeVec,
}

impl AuditMetricsInner {
    fn new() -> Self {
        Self {
            api_calls: register_int_counter_vec!(
                "ecs_audit_api_calls_total",
                "Upstream control-plane calls issued",
                &["operation"]
            )
            .expect("Failed to register api_calls_total"),

            api_errors: register_int_counter_vec!(
                "ecs_audit_api_errors_total",
                "Upstream control-plane calls that failed",
                &["operation"]
            )
            .expect("Failed to register api_errors_total"),

            api_latency_seconds: register_histogram_vec!(
                "ecs_audit_api_latency_seconds",
                "Latency of upstream control-plane calls",
                &["operation"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register api_latency_seconds"),

            tasks: register_int_gauge_vec!(
                "ecs_audit_tasks",
                "Task totals from the last audit (min_desired, running, max)",
                &["cluster", "kind"]
            )
            .expect("Failed to register tasks"),

            hosts: register_int_gauge_vec!(
                "ecs_audit_hosts",
                "Host counts from the last audit, configured and recommended",
                &["cluster", "bound"]
            )
            .expect("Failed to register hosts"),
        }
    }
}

/// Audit metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share it.
#[derive(Clone)]
pub struct AuditMetrics {
    _private: (),
}

impl Default for AuditMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AuditMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AuditMetricsInner {
        GLOBAL_METRICS.get_or_init(AuditMetricsInner::new)
    }

    /// Record one upstream call
    pub fn observe_api_call(&self, operation: &str, latency_secs: f64, success: bool) {
        let inner = self.inner();
        inner.api_calls.with_label_values(&[operation]).inc();
        inner
            .api_latency_seconds
            .with_label_values(&[operation])
            .observe(latency_secs);
        if !success {
            inner.api_errors.with_label_values(&[operation]).inc();
        }
    }

    /// Number of calls recorded for an operation
    pub fn api_calls(&self, operation: &str) -> u64 {
        self.inner().api_calls.with_label_values(&[operation]).get()
    }

    /// Publish the values of a finished report
    pub fn record_report(&self, cluster: &str, report: &CapacityReport) {
        let inner = self.inner();
        let tasks = [
            ("min_desired", report.total_min_desired_tasks),
            ("running", report.total_running_tasks),
            ("max", report.total_max_tasks),
        ];
        for (kind, value) in tasks {
            inner
                .tasks
                .with_label_values(&[cluster, kind])
                .set(saturating_i64(value));
        }

        let hosts = [
            ("configured_min", u64::from(report.host_group.min_size)),
            ("configured_desired", u64::from(report.host_group.desired_capacity)),
            ("configured_max", u64::from(report.host_group.max_size)),
            ("recommended_min", report.recommended_min),
            ("recommended_current", report.recommended_current),
            ("recommended_max", report.recommended_max),
        ];
        for (bound, value) in hosts {
            inner
                .hosts
                .with_label_values(&[cluster, bound])
                .set(saturating_i64(value));
        }
    }

    /// Encode every registered metric in the Prometheus text format
    pub fn encode_text(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&prometheus::gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics exposition is not UTF-8")
    }
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Structured logger for audit events
#[derive(Clone)]
pub struct StructuredLogger {
    cluster: String,
    region: String,
}

impl StructuredLogger {
    pub fn new(cluster: &Cluster) -> Self {
        Self {
            cluster: cluster.name.clone(),
            region: cluster.region.clone(),
        }
    }

    pub fn log_audit_started(&self) {
        info!(
            event = "audit_started",
            cluster = %self.cluster,
            region = %self.region,
            "Capacity audit started"
        );
    }

    pub fn log_collector_resolved(&self, collector: &str, detail: &str) {
        info!(
            event = "collector_resolved",
            cluster = %self.cluster,
            collector = %collector,
            detail = %detail,
            "Collector resolved"
        );
    }

    pub fn log_audit_completed(&self, report: &CapacityReport) {
        info!(
            event = "audit_completed",
            cluster = %self.cluster,
            region = %self.region,
            host_group = %report.host_group.name,
            services = report.service_count,
            total_min_desired_tasks = report.total_min_desired_tasks,
            total_running_tasks = report.total_running_tasks,
            total_max_tasks = report.total_max_tasks,
            recommended_min = report.recommended_min,
            recommended_current = report.recommended_current,
            recommended_max = report.recommended_max,
            "Capacity audit completed"
        );
    }

    /// Logged at `info`; callers surface the error themselves
    pub fn log_audit_failed(&self, error: &str) {
        info!(
            event = "audit_failed",
            cluster = %self.cluster,
            region = %self.region,
            error = %error,
            "Capacity audit aborted"
        );
    }
}
