//! Shared network binding.

use std::sync::Arc;

use super::BuildContext;
use crate::ports::{BindingOptions, PortResult, SharedBinding};

pub(super) async fn bind(ctx: BuildContext<'_>) -> PortResult<Option<Arc<dyn SharedBinding>>> {
    let Some(network) = &ctx.options.network else {
        return Ok(None);
    };
    let Some(port) = network.port else {
        return Ok(None);
    };

    let options = BindingOptions {
        host: network.host.clone(),
        port,
        tls: network.tls.clone(),
    };
    ctx.collaborators.network.bind(&options).await.map(Some)
}
