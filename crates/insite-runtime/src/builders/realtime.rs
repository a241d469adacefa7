//! Real-time server and the subsystems that ride on it.

use std::sync::Arc;

use super::BuildContext;
use crate::container::SiteComponents;
use crate::ports::{
    IncomingTransportHandle, OutgoingTransportHandle, PortResult, RealtimeServer,
    RealtimeSettings, SubscriptionDispatcher,
};

/// Local settings win; global TLS fills in when the section has none.
pub(super) fn settings(ctx: BuildContext<'_>, components: &SiteComponents) -> Option<RealtimeSettings> {
    let realtime = ctx.options.realtime.as_ref()?;
    let global_tls = ctx.options.network.as_ref().and_then(|n| n.tls.clone());

    Some(RealtimeSettings {
        binding: components.binding.clone(),
        port: realtime.port,
        path: realtime.path.clone(),
        tls: realtime.tls.clone().or(global_tls),
        extra: realtime.extra.clone(),
    })
}

pub(super) fn server(
    ctx: BuildContext<'_>,
    components: &SiteComponents,
) -> PortResult<Option<Arc<dyn RealtimeServer>>> {
    let Some(settings) = settings(ctx, components) else {
        return Ok(None);
    };
    ctx.collaborators.realtime.create(settings).map(Some)
}

pub(super) fn subscriptions(
    ctx: BuildContext<'_>,
    components: &SiteComponents,
    persistent: bool,
) -> PortResult<Option<Arc<dyn SubscriptionDispatcher>>> {
    let Some(realtime) = &components.realtime else {
        return Ok(None);
    };
    ctx.collaborators
        .subscriptions
        .create(realtime.clone(), persistent)
        .map(Some)
}

pub(super) fn incoming_transport(
    ctx: BuildContext<'_>,
    components: &SiteComponents,
) -> PortResult<Option<Arc<dyn IncomingTransportHandle>>> {
    let (Some(realtime), Some(options)) = (&components.realtime, &ctx.options.realtime) else {
        return Ok(None);
    };
    let transport_options = options
        .incoming_transport
        .enabled()
        .map(|transport| transport.options())
        .unwrap_or_default();

    ctx.collaborators
        .transports
        .incoming(realtime.clone(), &transport_options)
        .map(Some)
}

pub(super) fn outgoing_transport(
    ctx: BuildContext<'_>,
    components: &SiteComponents,
) -> PortResult<Option<Arc<dyn OutgoingTransportHandle>>> {
    let Some(realtime) = &components.realtime else {
        return Ok(None);
    };
    ctx.collaborators
        .transports
        .outgoing(realtime.clone())
        .map(Some)
}
