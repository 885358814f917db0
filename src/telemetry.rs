//! Metrics for AI gateway requests and background timers
//!
//! Metrics are recorded through the `metrics` facade and are no-ops unless a
//! recorder is installed (see [`init_metrics_exporter`]).
//!
//! # Metrics
//!
//! - `fitbot_ai_requests_total`: Counter of gateway requests by operation
//! - `fitbot_ai_request_duration_seconds`: Histogram of request duration
//! - `fitbot_ai_errors_total`: Counter of failed requests by error kind
//! - `fitbot_ai_in_flight`: Gauge of requests currently awaiting a reply
//! - `fitbot_food_items_identified`: Histogram of items returned per image
//! - `fitbot_reminders_sent_total`: Counter of hydration notifications
//!
//! # Examples
//!
//! ```
//! use fitbot::telemetry::AiRequestMetrics;
//!
//! let metrics = AiRequestMetrics::new("chat");
//! metrics.record_success();
//! ```

use metrics::{decrement_gauge, histogram, increment_counter, increment_gauge};
use std::cell::Cell;
use std::time::Instant;

/// Metrics for a single AI gateway request
///
/// Created when the request starts and finished with exactly one of
/// [`record_success`](Self::record_success) or
/// [`record_error`](Self::record_error). Dropping an unfinished tracker still
/// releases the in-flight gauge.
#[derive(Debug)]
pub struct AiRequestMetrics {
    operation: &'static str,
    start: Instant,
    recorded: Cell<bool>,
}

impl AiRequestMetrics {
    /// Start tracking a request for `operation` (`"chat"` or `"vision"`)
    pub fn new(operation: &'static str) -> Self {
        increment_counter!("fitbot_ai_requests_total", "operation" => operation);
        increment_gauge!("fitbot_ai_in_flight", 1.0, "operation" => operation);

        Self {
            operation,
            start: Instant::now(),
            recorded: Cell::new(false),
        }
    }

    /// Record a successful reply
    pub fn record_success(&self) {
        if self.recorded.replace(true) {
            return;
        }

        histogram!(
            "fitbot_ai_request_duration_seconds",
            self.start.elapsed().as_secs_f64(),
            "operation" => self.operation,
            "status" => "success"
        );
        decrement_gauge!("fitbot_ai_in_flight", 1.0, "operation" => self.operation);
    }

    /// Record a successful image analysis and how many items it found
    pub fn record_items(&self, count: usize) {
        histogram!("fitbot_food_items_identified", count as f64);
        self.record_success();
    }

    /// Record a failed request
    ///
    /// `error_kind` is a short label such as `"missing_credentials"`,
    /// `"transport"` or `"parse"`.
    pub fn record_error(&self, error_kind: &str) {
        if self.recorded.replace(true) {
            return;
        }

        increment_counter!(
            "fitbot_ai_errors_total",
            "operation" => self.operation,
            "error_kind" => error_kind.to_string()
        );
        histogram!(
            "fitbot_ai_request_duration_seconds",
            self.start.elapsed().as_secs_f64(),
            "operation" => self.operation,
            "status" => "error"
        );
        decrement_gauge!("fitbot_ai_in_flight", 1.0, "operation" => self.operation);
    }

    /// Operation label
    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

impl Drop for AiRequestMetrics {
    fn drop(&mut self) {
        if !self.recorded.get() {
            decrement_gauge!("fitbot_ai_in_flight", 1.0, "operation" => self.operation);
        }
    }
}

/// Count one delivered hydration notification
pub fn record_reminder_sent() {
    increment_counter!("fitbot_reminders_sent_total");
}

/// Initializes the metrics exporter for Prometheus
///
/// Only has an effect when compiled with the `prometheus` feature; otherwise
/// it is a safe no-op.
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
