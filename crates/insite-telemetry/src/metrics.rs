//! Prometheus metrics for site initialization.
//!
//! All metrics follow the naming convention: `insite_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec,
    Opts, Registry, TextEncoder,
};
use std::sync::Once;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // ORCHESTRATION
    // =========================================================================

    /// Subsystems constructed, by field name
    pub static ref SUBSYSTEMS_BUILT: CounterVec = CounterVec::new(
        Opts::new("insite_subsystems_built_total", "Subsystems constructed"),
        &["subsystem"]
    ).expect("metric creation failed");

    /// Subsystems requested but skipped for unmet preconditions
    pub static ref SUBSYSTEMS_SKIPPED: CounterVec = CounterVec::new(
        Opts::new("insite_subsystems_skipped_total", "Subsystems skipped for unmet preconditions"),
        &["subsystem"]
    ).expect("metric creation failed");

    /// Builder failures, by field name
    pub static ref SUBSYSTEM_FAILURES: CounterVec = CounterVec::new(
        Opts::new("insite_subsystem_failures_total", "Subsystem builder failures"),
        &["subsystem"]
    ).expect("metric creation failed");

    /// Time spent inside each builder
    pub static ref SUBSYSTEM_BUILD_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "insite_subsystem_build_duration_seconds",
            "Time spent constructing a subsystem"
        ).buckets(exponential_buckets(0.0001, 2.0, 16).expect("valid buckets")),
        &["subsystem"]
    ).expect("metric creation failed");

    /// End-to-end initialization time
    pub static ref INITIALIZATION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "insite_initialization_duration_seconds",
            "Time from initialize() to readiness"
        ).buckets(exponential_buckets(0.001, 2.0, 14).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // REAL-TIME SERVER
    // =========================================================================

    /// Real-time connections observed
    pub static ref REALTIME_CONNECTIONS: Counter = Counter::new(
        "insite_realtime_connections_total",
        "Real-time client connections"
    ).expect("metric creation failed");

    /// Real-time server errors observed
    pub static ref REALTIME_ERRORS: Counter = Counter::new(
        "insite_realtime_errors_total",
        "Real-time server errors"
    ).expect("metric creation failed");
}

static REGISTER: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Safe to call more than once; only the first call registers.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let mut result = Ok(());

    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(SUBSYSTEMS_BUILT.clone()),
            Box::new(SUBSYSTEMS_SKIPPED.clone()),
            Box::new(SUBSYSTEM_FAILURES.clone()),
            Box::new(SUBSYSTEM_BUILD_DURATION.clone()),
            Box::new(INITIALIZATION_DURATION.clone()),
            Box::new(REALTIME_CONNECTIONS.clone()),
            Box::new(REALTIME_ERRORS.clone()),
        ];

        for collector in collectors {
            if let Err(e) = REGISTRY.register(collector) {
                result = Err(TelemetryError::Metrics(e.to_string()));
                return;
            }
        }
    });

    result
}

/// Encode all registered metrics as Prometheus text format.
pub fn gather_text() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }

    /// Start a timer for one subsystem's builder.
    pub fn for_subsystem(subsystem: &str) -> Self {
        Self::new(&SUBSYSTEM_BUILD_DURATION.with_label_values(&[subsystem]))
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
