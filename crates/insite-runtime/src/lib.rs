//! # InSite Runtime Library
//!
//! Composition root for an InSite server. One options object names the
//! optional subsystems; [`Site`] builds the ones whose configuration is
//! present, in dependency order, exactly once, and publishes a single
//! readiness outcome.
//!
//! ## Architectural Patterns
//!
//! - **Hexagonal Architecture**: every collaborator is a port in [`ports`];
//!   in-memory adapters live in [`adapters`]
//! - **Presence-driven wiring**: [`wiring::resolve`] turns configuration
//!   presence into an ordered build plan; unmet preconditions are skipped
//! - **Event-Driven Observation**: lifecycle events go out on the site's
//!   `insite-bus` event bus
//! - **Typed shapes**: [`shape`] lifts field presence into the type system
//!
//! ## Quick Start
//!
//! ```no_run
//! use insite_runtime::{Collaborators, Site, SiteOptions};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let options = SiteOptions::from_json_str(r#"{
//!     "database": {"url": "mongodb://localhost", "name": "site"},
//!     "realtime": {},
//!     "users": {"server": {}},
//!     "http": true
//! }"#)?;
//!
//! let site = Site::init(options, Collaborators::in_memory()).await?;
//! assert!(site.users_server().is_some());
//! # Ok(())
//! # }
//! ```

#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_lines)]

pub mod adapters;
pub mod builders;
pub mod config;
pub mod container;
pub mod error;
pub mod ports;
pub mod registry;
pub mod shape;
pub mod wiring;

// Re-export the entry points
pub use config::{ConfigError, SiteOptions};
pub use container::{Site, SiteComponents, UsersVariant};
pub use error::{CollaboratorError, SiteError};
pub use ports::Collaborators;
pub use registry::{InitStatus, SubsystemId, SubsystemRegistry, SubsystemStatus};
