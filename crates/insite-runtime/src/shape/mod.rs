//! # Shape Projector
//!
//! Compile-time view of which subsystems a site will have.
//!
//! [`ShapedOptionsBuilder`] records each configured section in its type.
//! [`Projection`] maps that configuration shape to a result shape using the
//! same rules as the runtime resolver, and [`Shaped`] exposes exactly the
//! guaranteed fields, without `Option`.
//!
//! ```text
//!   ShapedOptionsBuilder<Shape<..>> ──build()──► ShapedOptions<S>
//!                                                      │
//!                                       Site::init_shaped(options, ..)
//!                                                      │
//!                                                      ▼
//!                                   Shaped<S>: accessors where S::HasX = Yes
//! ```
//!
//! ```no_run
//! use insite_runtime::config::{DatabaseOptions, HttpOptions};
//! use insite_runtime::shape::ShapedOptionsBuilder;
//! use insite_runtime::{Collaborators, Site};
//!
//! # async fn run() -> Result<(), insite_runtime::SiteError> {
//! let options = ShapedOptionsBuilder::new()
//!     .database(DatabaseOptions::new("mongodb://localhost", "site"))
//!     .http(HttpOptions::default())
//!     .build();
//!
//! let site = Site::init_shaped(options, Collaborators::in_memory()).await?;
//! println!("{} / {:?}", site.database().name(), site.http().middleware_names());
//! # Ok(())
//! # }
//! ```
//!
//! Asking for a field the shape does not guarantee does not compile:
//!
//! ```compile_fail
//! use insite_runtime::config::HttpOptions;
//! use insite_runtime::shape::ShapedOptionsBuilder;
//! use insite_runtime::{Collaborators, Site};
//!
//! # async fn run() -> Result<(), insite_runtime::SiteError> {
//! let options = ShapedOptionsBuilder::new().http(HttpOptions::default()).build();
//! let site = Site::init_shaped(options, Collaborators::in_memory()).await?;
//! // No users server, so no cookie setter
//! let _ = site.cookie();
//! # Ok(())
//! # }
//! ```

mod builder;
mod flags;
mod projection;

pub use builder::{EmptyShape, Shape, ShapedOptions, ShapedOptionsBuilder};
pub use flags::{Absent, And, Disabled, Flag, Implicit, No, Not, Or, Requested, Toggle, Yes};
pub use projection::{ConfigShape, Projection, Shaped};
