//! # Site Container
//!
//! The [`Site`] orchestrator, the components it holds, and its readiness
//! signal.
//!
//! - Subsystems are built in dependency order, exactly once
//! - Lifecycle events are published on the site's own event bus
//! - Readiness settles once and can be read any number of times

mod components;
mod readiness;
mod site;

pub use components::{SiteComponents, UsersVariant};
pub use site::Site;
