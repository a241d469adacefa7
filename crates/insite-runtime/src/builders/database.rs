//! Database connection and the configuration store on top of it.

use std::sync::Arc;

use super::BuildContext;
use crate::container::SiteComponents;
use crate::ports::{ConfigHandle, DatabaseConnection, PortResult};

pub(super) async fn connect(ctx: BuildContext<'_>) -> PortResult<Option<DatabaseConnection>> {
    let Some(options) = &ctx.options.database else {
        return Ok(None);
    };
    ctx.collaborators.database.connect(options).await.map(Some)
}

pub(super) async fn config_store(
    ctx: BuildContext<'_>,
    components: &SiteComponents,
) -> PortResult<Option<Arc<dyn ConfigHandle>>> {
    let (Some(schema), Some(collections)) = (&ctx.options.config_store, &components.collections)
    else {
        return Ok(None);
    };
    ctx.collaborators
        .config_store
        .init(collections.clone(), schema)
        .await
        .map(Some)
}
