/*!
 * # Metrics Module
 *
 * In-memory metrics for the dealership API.
 *
 * ## Features
 *
 * - HTTP request/response metrics (count, latency, status classes)
 * - Database operation latency
 * - Listing activity (submitted, approved, rejected, deleted, brands created)
 *
 * ## Metrics Formats
 *
 * - Prometheus text format at `/metrics`
 * - JSON format at `/metrics/json`
 */

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to export metrics: {0}")]
    ExportError(String),
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Counter {
    value: Arc<AtomicU64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Gauge {
    value: Arc<AtomicU64>,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: f64) {
        self.value.store(value as u64, Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        self.value.load(Ordering::Relaxed) as f64
    }
}

/// Count and running sum of observations. The sum is kept as `f64` bits so
/// sub-second latencies are not truncated.
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    sum_bits: Arc<AtomicU64>,
    count: Arc<AtomicU64>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, value: f64) {
        let _ = self
            .sum_bits
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f64::from_bits(bits) + value).to_bits())
            });
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn get_sum(&self) -> f64 {
        f64::from_bits(self.sum_bits.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    counters: DashMap<String, Counter>,
    gauges: DashMap<String, Gauge>,
    histograms: DashMap<String, Histogram>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create_counter(&self, name: &str) -> Counter {
        self.counters
            .entry(name.to_string())
            .or_insert_with(Counter::new)
            .clone()
    }

    pub fn get_or_create_gauge(&self, name: &str) -> Gauge {
        self.gauges
            .entry(name.to_string())
            .or_insert_with(Gauge::new)
            .clone()
    }

    pub fn get_or_create_histogram(&self, name: &str) -> Histogram {
        self.histograms
            .entry(name.to_string())
            .or_insert_with(Histogram::new)
            .clone()
    }

    pub fn export_metrics(&self) -> Result<String, MetricsError> {
        let mut output = String::new();

        for entry in self.counters.iter() {
            let (name, counter) = entry.pair();
            output.push_str(&format!("# TYPE {} counter\n", name));
            output.push_str(&format!("{} {}\n", name, counter.get()));
        }

        for entry in self.gauges.iter() {
            let (name, gauge) = entry.pair();
            output.push_str(&format!("# TYPE {} gauge\n", name));
            output.push_str(&format!("{} {}\n", name, gauge.get()));
        }

        for entry in self.histograms.iter() {
            let (name, histogram) = entry.pair();
            output.push_str(&format!("# TYPE {} summary\n", name));
            output.push_str(&format!("{}_count {}\n", name, histogram.get_count()));
            output.push_str(&format!("{}_sum {}\n", name, histogram.get_sum()));
        }

        Ok(output)
    }

    pub fn export_metrics_json(&self) -> Result<serde_json::Value, MetricsError> {
        let mut counters = serde_json::Map::new();
        for entry in self.counters.iter() {
            let (name, counter) = entry.pair();
            counters.insert(name.to_string(), json!(counter.get()));
        }

        let mut gauges = serde_json::Map::new();
        for entry in self.gauges.iter() {
            let (name, gauge) = entry.pair();
            gauges.insert(name.to_string(), json!(gauge.get()));
        }

        let mut histograms = serde_json::Map::new();
        for entry in self.histograms.iter() {
            let (name, histogram) = entry.pair();
            histograms.insert(
                name.to_string(),
                json!({
                    "count": histogram.get_count(),
                    "sum": histogram.get_sum(),
                }),
            );
        }

        Ok(json!({
            "counters": counters,
            "gauges": gauges,
            "histograms": histograms,
        }))
    }
}

// Global metrics registry
lazy_static::lazy_static! {
    pub static ref METRICS: MetricsRegistry = MetricsRegistry::new();
}

pub fn increment_counter(name: &str) {
    METRICS.get_or_create_counter(name).inc();
}

pub fn set_gauge(name: &str, value: f64) {
    METRICS.get_or_create_gauge(name).set(value);
}

pub fn observe_histogram(name: &str, value: f64) {
    METRICS.get_or_create_histogram(name).observe(value);
}

/// Sell listing and catalog activity counters
pub struct ListingMetrics {
    pub listings_submitted: Counter,
    pub listings_approved: Counter,
    pub listings_rejected: Counter,
    pub listings_status_changed: Counter,
    pub listings_deleted: Counter,
    pub brands_created: Counter,
    pub cars_published: Counter,
    pub approval_failures: Counter,
    pub approval_duration: Histogram,
}

impl ListingMetrics {
    pub fn new() -> Self {
        Self {
            listings_submitted: METRICS.get_or_create_counter("sell_listings_submitted_total"),
            listings_approved: METRICS.get_or_create_counter("sell_listings_approved_total"),
            listings_rejected: METRICS.get_or_create_counter("sell_listings_rejected_total"),
            listings_status_changed: METRICS
                .get_or_create_counter("sell_listings_status_changed_total"),
            listings_deleted: METRICS.get_or_create_counter("sell_listings_deleted_total"),
            brands_created: METRICS.get_or_create_counter("brands_created_total"),
            cars_published: METRICS.get_or_create_counter("cars_published_total"),
            approval_failures: METRICS.get_or_create_counter("sell_listing_approval_failures_total"),
            approval_duration: METRICS
                .get_or_create_histogram("sell_listing_approval_duration_seconds"),
        }
    }

    pub fn observe_approval(&self, duration: Duration) {
        self.approval_duration.observe(duration.as_secs_f64());
    }

    pub fn record_approval_failure(&self) {
        self.approval_failures.inc();
    }
}

// HTTP endpoint-specific metrics
pub struct EndpointMetrics {
    pub requests_total: Counter,
    pub request_duration: Histogram,
    pub status_2xx: Counter,
    pub status_4xx: Counter,
    pub status_5xx: Counter,
}

impl EndpointMetrics {
    pub fn new() -> Self {
        Self {
            requests_total: METRICS.get_or_create_counter("http_requests_total"),
            request_duration: METRICS.get_or_create_histogram("http_request_duration_seconds"),
            status_2xx: METRICS.get_or_create_counter("http_status_2xx_total"),
            status_4xx: METRICS.get_or_create_counter("http_status_4xx_total"),
            status_5xx: METRICS.get_or_create_counter("http_status_5xx_total"),
        }
    }

    pub fn record_request(&self, duration: Duration, status_code: u16) {
        self.requests_total.inc();
        self.request_duration.observe(duration.as_secs_f64());

        match status_code {
            200..=299 => self.status_2xx.inc(),
            400..=499 => self.status_4xx.inc(),
            500..=599 => self.status_5xx.inc(),
            _ => {}
        }
    }
}

// Global instances
lazy_static::lazy_static! {
    pub static ref LISTING_METRICS: ListingMetrics = ListingMetrics::new();
    pub static ref ENDPOINT_METRICS: EndpointMetrics = EndpointMetrics::new();
}

/// Records request count, latency and status class for every routed request
pub async fn track_http_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let response = next.run(req).await;
    ENDPOINT_METRICS.record_request(start.elapsed(), response.status().as_u16());
    response
}

// HTTP endpoint handlers for metrics
pub async fn metrics_handler() -> Result<Response, MetricsError> {
    let body = METRICS.export_metrics()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

pub async fn metrics_json_handler() -> Result<Json<serde_json::Value>, MetricsError> {
    METRICS.export_metrics_json().map(Json)
}

pub fn get_metrics_summary() -> String {
    format!(
        "Requests: {}, Listings submitted: {}, Approved: {}, Rejected: {}, Deleted: {}",
        ENDPOINT_METRICS.requests_total.get(),
        LISTING_METRICS.listings_submitted.get(),
        LISTING_METRICS.listings_approved.get(),
        LISTING_METRICS.listings_rejected.get(),
        LISTING_METRICS.listings_deleted.get(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_keeps_fractional_sums() {
        let h = Histogram::new();
        h.observe(0.25);
        h.observe(0.5);
        assert_eq!(h.get_count(), 2);
        assert!((h.get_sum() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn registry_exports_prometheus_text_and_json() {
        let registry = MetricsRegistry::new();
        registry.get_or_create_counter("widgets_total").inc_by(3);
        registry.get_or_create_gauge("queue_depth").set(7.0);
        registry.get_or_create_histogram("op_seconds").observe(1.5);

        let text = registry.export_metrics().unwrap();
        assert!(text.contains("# TYPE widgets_total counter\nwidgets_total 3\n"));
        assert!(text.contains("queue_depth 7"));
        assert!(text.contains("op_seconds_count 1"));

        let json = registry.export_metrics_json().unwrap();
        assert_eq!(json["counters"]["widgets_total"], 3);
        assert_eq!(json["histograms"]["op_seconds"]["count"], 1);
    }

    #[test]
    fn counters_are_shared_by_name() {
        let registry = MetricsRegistry::new();
        registry.get_or_create_counter("shared").inc();
        registry.get_or_create_counter("shared").inc();
        assert_eq!(registry.get_or_create_counter("shared").get(), 2);
    }
}
