//! Users layer, plain or owned by the networked users server.

use std::sync::Arc;

use super::BuildContext;
use crate::config::UsersOptions;
use crate::container::SiteComponents;
use crate::ports::{PortResult, UsersLayer, UsersServer, UsersServerContext};

/// The users section without its `server` part.
fn layer_options(options: &UsersOptions) -> UsersOptions {
    UsersOptions {
        server: None,
        ..options.clone()
    }
}

pub(super) async fn plain(
    ctx: BuildContext<'_>,
    components: &SiteComponents,
) -> PortResult<Option<Arc<dyn UsersLayer>>> {
    let (Some(options), Some(collections)) = (&ctx.options.users, &components.collections) else {
        return Ok(None);
    };
    ctx.collaborators
        .users
        .init_users(collections.clone(), &layer_options(options))
        .await
        .map(Some)
}

pub(super) async fn server(
    ctx: BuildContext<'_>,
    components: &SiteComponents,
) -> PortResult<Option<Arc<dyn UsersServer>>> {
    let Some(options) = &ctx.options.users else {
        return Ok(None);
    };
    let (Some(server), Some(collections), Some(realtime), Some(_)) = (
        &options.server,
        &components.collections,
        &components.realtime,
        &components.subscriptions,
    ) else {
        return Ok(None);
    };

    let context = UsersServerContext {
        realtime: realtime.clone(),
        collections: collections.clone(),
        incoming_transport: components.incoming_transport.clone(),
        users: layer_options(options),
        server: server.clone(),
        public: ctx.options.public,
    };
    ctx.collaborators.users.init_server(context).await.map(Some)
}
