//! # Site Configuration
//!
//! A single, partially optional options object. Which sections are present
//! decides which subsystems get built; see [`crate::wiring`] for the rules.
//!
//! ```json
//! {
//!   "database": { "url": "mongodb://localhost", "name": "site" },
//!   "network": { "port": 8443 },
//!   "realtime": { "subscriptions": true },
//!   "users": { "server": {} },
//!   "http": true
//! }
//! ```

mod loader;
mod options;
mod section;

pub use loader::{DEFAULT_CONFIG_FILE, DEFAULT_DATABASE_NAME};
pub use options::{
    ConfigSchema, CookieOptions, DatabaseOptions, HttpOptions, IncomingTransport,
    IncomingTransportOptions, NetworkOptions, RealtimeOptions, Settings, SiteOptions, TlsOptions,
    UsersOptions, UsersServerOptions,
};
pub use section::Section;

use std::path::PathBuf;
use thiserror::Error;

/// Errors loading or validating options.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("failed to parse options: {0}")]
    Parse(String),

    #[error("invalid options: {0}")]
    Invalid(String),
}
