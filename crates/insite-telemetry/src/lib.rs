//! # InSite Telemetry
//!
//! Structured logging and Prometheus metrics for the InSite runtime.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use insite_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(&TelemetryConfig::from_env()).expect("telemetry");
//!     // Logs and metrics are now being collected
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `INSITE_SERVICE_NAME` | `insite` | Service name on every log line |
//! | `INSITE_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter directive |
//! | `INSITE_CONSOLE_OUTPUT` | `true` | Write logs to the console |
//! | `INSITE_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |

mod config;
mod logging;
mod metrics;

pub use config::{parse_flag, TelemetryConfig};
pub use logging::init_logging;
pub use metrics::{
    gather_text, register_metrics, HistogramTimer, INITIALIZATION_DURATION, REALTIME_CONNECTIONS,
    REALTIME_ERRORS, REGISTRY, SUBSYSTEMS_BUILT, SUBSYSTEMS_SKIPPED, SUBSYSTEM_BUILD_DURATION,
    SUBSYSTEM_FAILURES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    Metrics(String),
}

/// Register metrics and install the logging subscriber.
///
/// Returns a guard to hold for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first, so builders never observe an unregistered collector
    register_metrics()?;
    init_logging(config)?;

    Ok(TelemetryGuard {
        service_name: config.service_name.clone(),
    })
}

/// Guard that keeps telemetry active. Logs shutdown when dropped.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
