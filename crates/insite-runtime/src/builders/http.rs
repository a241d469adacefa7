//! HTTP server and its middleware pipeline.

use std::sync::Arc;

use super::BuildContext;
use crate::config::{HttpOptions, Settings};
use crate::container::SiteComponents;
use crate::ports::{HttpServer, HttpSettings, Middleware, PortResult};
use crate::wiring::MiddlewareSlot;

pub(super) fn server(
    ctx: BuildContext<'_>,
    components: &SiteComponents,
    slots: &[MiddlewareSlot],
) -> PortResult<Option<Arc<dyn HttpServer>>> {
    let Some(http) = &ctx.options.http else {
        return Ok(None);
    };

    let middlewares = pipeline(ctx, http, slots)?;
    let global = ctx.options.network.as_ref();
    let settings = HttpSettings {
        binding: components.binding.clone(),
        port: http.port,
        host: http.host.clone().or_else(|| global.and_then(|n| n.host.clone())),
        tls: http.tls.clone().or_else(|| global.and_then(|n| n.tls.clone())),
        extra: http.extra.clone(),
    };

    ctx.collaborators.http.create(settings, middlewares).map(Some)
}

fn pipeline(
    ctx: BuildContext<'_>,
    http: &HttpOptions,
    slots: &[MiddlewareSlot],
) -> PortResult<Vec<Arc<dyn Middleware>>> {
    let factory = &ctx.collaborators.http;
    let mut middlewares = Vec::with_capacity(slots.len());

    for slot in slots {
        let middleware = match slot {
            MiddlewareSlot::Cookie => {
                let options = ctx
                    .options
                    .cookie
                    .enabled()
                    .map(|cookie| cookie.middleware.clone())
                    .unwrap_or_default();
                factory.cookie_middleware(&options)?
            }
            MiddlewareSlot::Static => {
                factory.static_middleware(&section_or_default(&http.static_files))?
            }
            MiddlewareSlot::Template => {
                factory.template_middleware(&section_or_default(&http.template))?
            }
            MiddlewareSlot::Custom(index) => match http.middlewares.get(*index) {
                Some(custom) => custom.clone(),
                None => continue,
            },
        };
        middlewares.push(middleware);
    }

    Ok(middlewares)
}

fn section_or_default(section: &crate::config::Section<Settings>) -> Settings {
    section.or_default_unless_disabled().unwrap_or_default()
}
