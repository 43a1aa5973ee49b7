//! Metrics and observability utilities
//!
//! Prometheus metrics for the catalog with standardized naming
//! conventions.

use crate::db::models::ReportTargetKind;
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all WOF metrics
pub const METRICS_PREFIX: &str = "wof";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Catalog metrics
    describe_counter!(
        format!("{}_contributions_total", METRICS_PREFIX),
        Unit::Count,
        "Catalog entries created, by kind"
    );

    describe_counter!(
        format!("{}_votes_total", METRICS_PREFIX),
        Unit::Count,
        "Link upvotes cast"
    );

    describe_counter!(
        format!("{}_favorites_total", METRICS_PREFIX),
        Unit::Count,
        "Favorite additions and removals"
    );

    // Moderation metrics
    describe_counter!(
        format!("{}_reports_total", METRICS_PREFIX),
        Unit::Count,
        "Reports filed, by target kind"
    );

    // Account metrics
    describe_counter!(
        format!("{}_accounts_created_total", METRICS_PREFIX),
        Unit::Count,
        "Accounts created"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// A language, framework, version, hello world, feature, opinion, link or
/// comment was added
pub fn record_contribution(kind: &'static str) {
    counter!(
        format!("{}_contributions_total", METRICS_PREFIX),
        "kind" => kind
    )
    .increment(1);
}

pub fn record_vote() {
    counter!(format!("{}_votes_total", METRICS_PREFIX)).increment(1);
}

pub fn record_favorite(added: bool) {
    let action = if added { "add" } else { "remove" };

    counter!(
        format!("{}_favorites_total", METRICS_PREFIX),
        "action" => action
    )
    .increment(1);
}

pub fn record_report(kind: ReportTargetKind) {
    let target = match kind {
        ReportTargetKind::Language => "language",
        ReportTargetKind::Framework => "framework",
        ReportTargetKind::Opinion => "opinion",
        ReportTargetKind::Comment => "comment",
    };

    counter!(
        format!("{}_reports_total", METRICS_PREFIX),
        "target" => target
    )
    .increment(1);
}

pub fn record_account_created(is_admin: bool) {
    counter!(
        format!("{}_accounts_created_total", METRICS_PREFIX),
        "admin" => is_admin.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets_are_sorted() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_recorders_run_without_exporter() {
        register_metrics();
        record_contribution("feature");
        record_vote();
        record_favorite(true);
        record_report(ReportTargetKind::Comment);
        record_account_created(false);

        let metrics = RequestMetrics::start("GET", "/home");
        metrics.finish(200);
    }
}
