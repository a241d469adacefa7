//! Cookie/session setter.

use std::sync::Arc;

use super::BuildContext;
use crate::container::SiteComponents;
use crate::ports::{CookieSetter, PortResult};

pub(super) fn setter(
    ctx: BuildContext<'_>,
    components: &SiteComponents,
) -> PortResult<Option<Arc<dyn CookieSetter>>> {
    if ctx.options.cookie.is_disabled() || components.http.is_none() {
        return Ok(None);
    }
    let Some(users_server) = &components.users_server else {
        return Ok(None);
    };

    // Absent section: the setter is still built, with defaults
    let options = ctx
        .options
        .cookie
        .enabled()
        .map(|cookie| cookie.setter.clone())
        .unwrap_or_default();

    ctx.collaborators
        .cookie
        .create(options, users_server.clone())
        .map(Some)
}
