//! Metrics and observability utilities
//!
//! Prometheus metrics for record creation and report execution, using the
//! `biobank_` naming prefix.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Duration;

/// Metrics prefix for all biobank metrics
pub const METRICS_PREFIX: &str = "biobank";

/// Histogram buckets for report latency (in seconds)
pub const REPORT_BUCKETS: &[f64] = &[
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
    10.00,  // 10s
];

/// Full name of a metric, with the common prefix
pub fn metric_name(suffix: &str) -> String {
    format!("{}_{}", METRICS_PREFIX, suffix)
}

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        metric_name("records_created_total"),
        Unit::Count,
        "Records successfully inserted, by resource"
    );

    describe_counter!(
        metric_name("record_errors_total"),
        Unit::Count,
        "Rejected or failed record inserts, by resource"
    );

    describe_counter!(
        metric_name("reports_total"),
        Unit::Count,
        "Report executions, by report and status"
    );

    describe_histogram!(
        metric_name("report_duration_seconds"),
        Unit::Seconds,
        "Report routine latency in seconds"
    );

    tracing::info!("Metrics registered");
}

/// A record of `resource` was inserted
pub fn record_created(resource: &str) {
    counter!(
        metric_name("records_created_total"),
        "resource" => resource.to_string()
    )
    .increment(1);
}

/// An insert of `resource` was rejected or failed
pub fn record_error(resource: &str) {
    counter!(
        metric_name("record_errors_total"),
        "resource" => resource.to_string()
    )
    .increment(1);
}

/// A report routine finished
pub fn record_report(report: &str, elapsed: Duration, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        metric_name("reports_total"),
        "report" => report.to_string(),
        "status" => status
    )
    .increment(1);

    histogram!(
        metric_name("report_duration_seconds"),
        "report" => report.to_string()
    )
    .record(elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn test_report_buckets_sorted() {
        let mut prev = 0.0;
        for &bucket in REPORT_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_metric_name() {
        assert_eq!(metric_name("reports_total"), "biobank_reports_total");
    }

    #[test]
    fn test_recorded_series() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_created("donor");
            record_created("donor");
            record_error("cause");
            record_report("op2", Duration::from_millis(3), true);
            record_report("op3", Duration::from_millis(8), false);
        });

        let output = handle.render();
        assert!(output.contains(r#"biobank_records_created_total{resource="donor"} 2"#));
        assert!(output.contains(r#"biobank_record_errors_total{resource="cause"} 1"#));
        assert!(output.contains(r#"biobank_reports_total{report="op2",status="success"} 1"#));
        assert!(output.contains(r#"biobank_reports_total{report="op3",status="error"} 1"#));
        assert!(output.contains("biobank_report_duration_seconds"));
    }
}
