//! # Subsystem Builders
//!
//! One thin adapter per subsystem: pick the inputs out of what is already
//! built, merge options, call the port. A builder whose inputs are missing
//! returns `Ok(None)` and the step is recorded as skipped.
//!
//! [`execute`] wraps every builder with the same bookkeeping: a build-time
//! histogram, built/skipped/failed counters, a registry status, a log line
//! and a bus event.

mod cookie;
mod database;
mod http;
mod network;
mod realtime;
mod users;

use std::time::Instant;

use insite_bus::{InMemoryEventBus, SiteEvent};
use insite_telemetry::{
    log_subsystem, metric_inc, HistogramTimer, SUBSYSTEMS_BUILT, SUBSYSTEMS_SKIPPED,
    SUBSYSTEM_FAILURES,
};

use crate::config::SiteOptions;
use crate::container::SiteComponents;
use crate::error::CollaboratorError;
use crate::ports::Collaborators;
use crate::registry::{SubsystemId, SubsystemRegistry, SubsystemStatus};
use crate::wiring::{BuildStep, PlannedStep};

/// Everything a builder may read.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub options: &'a SiteOptions,
    pub collaborators: &'a Collaborators,
    pub bus: &'a InMemoryEventBus,
    pub registry: &'a SubsystemRegistry,
}

/// Run one planned step against the components built so far.
///
/// Attaches the output on success. Errors are returned untouched; nothing
/// already attached is rolled back.
pub async fn execute(
    ctx: BuildContext<'_>,
    planned: &PlannedStep,
    components: &mut SiteComponents,
) -> Result<(), CollaboratorError> {
    let id = planned.step.id();
    let started = Instant::now();
    let _timer = HistogramTimer::for_subsystem(id.name());

    let outcome = match &planned.step {
        BuildStep::Database => database::connect(ctx).await.map(|out| {
            out.map(|connection| components.attach_database(connection))
        }),
        BuildStep::ConfigStore => database::config_store(ctx, components)
            .await
            .map(|out| out.map(|config| components.config = Some(config))),
        BuildStep::SharedBinding => network::bind(ctx)
            .await
            .map(|out| out.map(|binding| components.binding = Some(binding))),
        BuildStep::Realtime => realtime::server(ctx, components)
            .map(|out| out.map(|server| components.realtime = Some(server))),
        BuildStep::Subscriptions { persistent } => {
            realtime::subscriptions(ctx, components, *persistent)
                .map(|out| out.map(|dispatcher| components.subscriptions = Some(dispatcher)))
        }
        BuildStep::IncomingTransport => realtime::incoming_transport(ctx, components)
            .map(|out| out.map(|transport| components.incoming_transport = Some(transport))),
        BuildStep::OutgoingTransport => realtime::outgoing_transport(ctx, components)
            .map(|out| out.map(|transport| components.outgoing_transport = Some(transport))),
        BuildStep::UsersServer => users::server(ctx, components)
            .await
            .map(|out| out.map(|server| components.attach_users_server(server))),
        BuildStep::Users => users::plain(ctx, components)
            .await
            .map(|out| out.map(|users| components.users = Some(users))),
        BuildStep::Http { middlewares } => http::server(ctx, components, middlewares)
            .map(|out| out.map(|server| components.http = Some(server))),
        BuildStep::Cookie => cookie::setter(ctx, components)
            .map(|out| out.map(|setter| components.cookie = Some(setter))),
    };

    match outcome {
        Ok(Some(())) => {
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            record_built(ctx, id, elapsed_ms);
            // The networked server brings its own users layer
            if id == SubsystemId::UsersServer && components.has(SubsystemId::Users) {
                record_built(ctx, SubsystemId::Users, elapsed_ms);
            }
            Ok(())
        }
        Ok(None) => {
            let reason = missing_input(planned, components)
                .map_or_else(|| "inputs unavailable".to_string(), |m| format!("{m} not built"));
            log_subsystem!(debug, id.name(), "Subsystem skipped", %reason);
            metric_inc!(SUBSYSTEMS_SKIPPED, &[id.name()]);
            ctx.registry.set(id, SubsystemStatus::Skipped);
            ctx.bus.emit(SiteEvent::SubsystemSkipped {
                subsystem: id.name().to_string(),
                reason,
            });
            Ok(())
        }
        Err(e) => {
            log_subsystem!(error, id.name(), "Subsystem failed", error = %e);
            metric_inc!(SUBSYSTEM_FAILURES, &[id.name()]);
            ctx.registry.set(id, SubsystemStatus::Failed);
            Err(e)
        }
    }
}

fn record_built(ctx: BuildContext<'_>, id: SubsystemId, elapsed_ms: u64) {
    log_subsystem!(info, id.name(), "Subsystem built", elapsed_ms);
    metric_inc!(SUBSYSTEMS_BUILT, &[id.name()]);
    ctx.registry.set(id, SubsystemStatus::Built);
    ctx.bus.emit(SiteEvent::SubsystemBuilt {
        subsystem: id.name().to_string(),
        elapsed_ms,
    });
}

fn missing_input(planned: &PlannedStep, components: &SiteComponents) -> Option<SubsystemId> {
    planned
        .inputs
        .iter()
        .copied()
        .find(|input| !components.has(*input))
}
