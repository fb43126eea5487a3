//! Metrics bootstrap
//!
//! The store and search index emit counters and histograms through the
//! `metrics` facade:
//!
//! - `chat_sessions_saved_total`: Counter of session saves
//! - `chat_sessions_evicted_total`: Counter of sessions evicted past the cap
//! - `chat_sessions_repaired_total`: Counter of corrupt records self-healed
//! - `chat_search_queries_total`: Counter of search queries served
//! - `chat_search_duration_seconds`: Histogram of search latency
//!
//! Without an installed exporter the facade is a no-op, so recording is
//! always safe.

/// Initializes the metrics exporter for Prometheus
///
/// When the `prometheus` feature is enabled, this function sets up the
/// Prometheus metrics exporter to expose metrics on the standard
/// Prometheus endpoint. When disabled, it's a no-op.
///
/// # Examples
///
/// ```
/// use coachlog::metrics::init_metrics_exporter;
///
/// // Initialize metrics (only does something with the prometheus feature)
/// init_metrics_exporter();
/// ```
pub fn init_metrics_exporter() {
    #[cfg(feature = "prometheus")]
    {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let _ = builder.install().map_err(|e| {
            tracing::warn!("Failed to install Prometheus exporter: {}", e);
        });
    }
}
