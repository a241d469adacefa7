//! # InSite Server
//!
//! Runs a site wired to the in-memory collaborators.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (`INSITE_LOG_LEVEL`, `INSITE_JSON_LOGS`, ...)
//! 2. Load options (`INSITE_CONFIG`, or `insite.json` when present)
//! 3. Apply environment overrides and validate
//! 4. Build the configured subsystems
//! 5. Wait for Ctrl+C

use anyhow::{Context, Result};
use insite_bus::EventFilter;
use insite_runtime::{Collaborators, Site, SiteOptions};
use insite_telemetry::{init_telemetry, TelemetryConfig};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    let _guard = init_telemetry(&telemetry).context("failed to initialize telemetry")?;

    let options = SiteOptions::from_env().context("failed to load site options")?;
    options.validate().context("invalid site options")?;

    info!("===========================================");
    info!("  InSite v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let site = Site::launch(options, Collaborators::in_memory());

    let mut events = site.events().subscribe(EventFilter::all());
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(topic = ?event.topic(), "Site event");
        }
    });

    let site = site.when_ready().await.context("site failed to start")?;
    site.registry().print_status();

    let built: Vec<_> = site.built().iter().map(|id| id.name()).collect();
    info!(built = ?built, "Site is running. Press Ctrl+C to stop.");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown complete");

    Ok(())
}
