//! Metrics and observability utilities
//!
//! Prometheus-style metrics with a shared prefix. Recording is a no-op until a
//! recorder (the Prometheus exporter in the gateway) is installed.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};

/// Metrics prefix for all MovieReview metrics
pub const METRICS_PREFIX: &str = "moviereview";

/// Buckets for classifier latency (remote calls are slow)
pub const CLASSIFIER_BUCKETS: &[f64] = &[
    0.001,  // 1ms, local lexicon
    0.010,  // 10ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.000,  // 2s
    5.000,  // 5s
    10.00,  // 10s, default timeout
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_movies_added_total", METRICS_PREFIX),
        Unit::Count,
        "Total movies added"
    );

    describe_counter!(
        format!("{}_movies_deleted_total", METRICS_PREFIX),
        Unit::Count,
        "Total movies deleted"
    );

    describe_counter!(
        format!("{}_comments_added_total", METRICS_PREFIX),
        Unit::Count,
        "Total comments added"
    );

    describe_counter!(
        format!("{}_comments_deleted_total", METRICS_PREFIX),
        Unit::Count,
        "Total comments deleted"
    );

    describe_counter!(
        format!("{}_classifications_total", METRICS_PREFIX),
        Unit::Count,
        "Total sentiment classifications"
    );

    describe_counter!(
        format!("{}_classifier_fallbacks_total", METRICS_PREFIX),
        Unit::Count,
        "Classifications that fell back to the neutral default"
    );

    describe_histogram!(
        format!("{}_classification_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Sentiment classification latency in seconds"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record one classification
pub fn record_classification(duration_secs: f64, provider: &str) {
    counter!(
        format!("{}_classifications_total", METRICS_PREFIX),
        "provider" => provider.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_classification_duration_seconds", METRICS_PREFIX),
        "provider" => provider.to_string()
    )
    .record(duration_secs);
}

/// Helper to record a classifier falling back to its default
pub fn record_classifier_fallback(provider: &str, reason: &str) {
    counter!(
        format!("{}_classifier_fallbacks_total", METRICS_PREFIX),
        "provider" => provider.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Helper to record catalogue mutations
pub fn record_movie_added() {
    counter!(format!("{}_movies_added_total", METRICS_PREFIX)).increment(1);
}

pub fn record_movie_deleted() {
    counter!(format!("{}_movies_deleted_total", METRICS_PREFIX)).increment(1);
}

pub fn record_comment_added(emotion: &str) {
    counter!(
        format!("{}_comments_added_total", METRICS_PREFIX),
        "emotion" => emotion.to_string()
    )
    .increment(1);
}

pub fn record_comments_deleted(count: u64) {
    counter!(format!("{}_comments_deleted_total", METRICS_PREFIX)).increment(count);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_buckets_sorted() {
        let mut prev = 0.0;
        for &bucket in CLASSIFIER_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_recording_without_recorder() {
        register_metrics();
        record_classification(0.002, "lexicon");
        record_classifier_fallback("openai", "timeout");
        record_comments_deleted(2);
        // Just verify it runs without panic
    }
}
