//! # Subsystem Registry
//!
//! Names every subsystem a site can own, their hard prerequisites, and the
//! per-subsystem outcome of one initialization run.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      SubsystemRegistry                          │
//! │                                                                 │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐         │
//! │  │ database │  │ realtime │  │  users   │  │   ...    │         │
//! │  │  BUILT   │  │  BUILT   │  │ SKIPPED  │  │          │         │
//! │  └──────────┘  └──────────┘  └──────────┘  └──────────┘         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A subsystem is never required. Missing prerequisites make it skip,
//! and a skip is not an error.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::info;

/// Subsystem identifier. `name()` is the stable field name on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsystemId {
    /// Database client, handle and collections
    Database,
    /// Configuration store over the database collections
    ConfigStore,
    /// Listening socket shared by realtime and http
    SharedBinding,
    /// Real-time connection server
    Realtime,
    /// Subscription dispatcher
    Subscriptions,
    /// Inbound message transport
    IncomingTransport,
    /// Outbound message transport
    OutgoingTransport,
    /// Users layer (plain, or owned by the users server)
    Users,
    /// Networked users server
    UsersServer,
    /// HTTP server
    Http,
    /// Cookie/session setter
    Cookie,
}

impl SubsystemId {
    /// Get the field name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::ConfigStore => "config",
            Self::SharedBinding => "binding",
            Self::Realtime => "realtime",
            Self::Subscriptions => "subscriptions",
            Self::IncomingTransport => "incoming_transport",
            Self::OutgoingTransport => "outgoing_transport",
            Self::Users => "users",
            Self::UsersServer => "users_server",
            Self::Http => "http",
            Self::Cookie => "cookie",
        }
    }

    /// Get subsystem dependencies.
    /// Returns subsystems that MUST be built for this one to be built.
    #[must_use]
    pub fn dependencies(&self) -> Vec<SubsystemId> {
        match self {
            // Roots
            Self::Database | Self::SharedBinding | Self::Realtime | Self::Http => vec![],

            // Database lane
            Self::ConfigStore | Self::Users => vec![Self::Database],

            // Real-time dependents
            Self::Subscriptions | Self::IncomingTransport | Self::OutgoingTransport => {
                vec![Self::Realtime]
            }

            // Composite
            Self::UsersServer => vec![Self::Database, Self::Realtime, Self::Subscriptions],
            Self::Cookie => vec![Self::UsersServer, Self::Http],
        }
    }

    /// Get all subsystem IDs, in build order.
    #[must_use]
    pub fn all() -> Vec<SubsystemId> {
        vec![
            Self::Database,
            Self::ConfigStore,
            Self::SharedBinding,
            Self::Realtime,
            Self::Subscriptions,
            Self::IncomingTransport,
            Self::OutgoingTransport,
            Self::UsersServer,
            Self::Users,
            Self::Http,
            Self::Cookie,
        ]
    }
}

impl fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle of a site's one-shot initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InitStatus {
    NotStarted = 0,
    InProgress = 1,
    Ready = 2,
    Failed = 3,
}

impl InitStatus {
    /// Decode a value stored in an `AtomicU8`.
    #[must_use]
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::NotStarted,
            1 => Self::InProgress,
            2 => Self::Ready,
            _ => Self::Failed,
        }
    }

    /// Ready or failed; nothing more will happen.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

/// Outcome for a single subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsystemStatus {
    /// Options did not ask for it.
    NotRequested,
    /// Planned, not yet built.
    Pending,
    /// Requested, but a prerequisite was missing at build time.
    Skipped,
    /// Built and attached.
    Built,
    /// Builder returned an error.
    Failed,
}

/// Per-subsystem outcomes of one site's initialization.
#[derive(Debug, Default)]
pub struct SubsystemRegistry {
    status: RwLock<HashMap<SubsystemId, SubsystemStatus>>,
}

impl SubsystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome.
    pub fn set(&self, id: SubsystemId, status: SubsystemStatus) {
        self.status.write().insert(id, status);
    }

    /// Get status of a subsystem.
    pub fn get_status(&self, id: SubsystemId) -> SubsystemStatus {
        self.status
            .read()
            .get(&id)
            .copied()
            .unwrap_or(SubsystemStatus::NotRequested)
    }

    /// Get all statuses.
    pub fn get_all_status(&self) -> HashMap<SubsystemId, SubsystemStatus> {
        self.status.read().clone()
    }

    /// Subsystems that reached `Built`, in build order.
    pub fn built(&self) -> Vec<SubsystemId> {
        let status = self.status.read();
        SubsystemId::all()
            .into_iter()
            .filter(|id| status.get(id) == Some(&SubsystemStatus::Built))
            .collect()
    }

    /// Print registry status.
    pub fn print_status(&self) {
        info!("===========================================");
        info!("  SITE SUBSYSTEM STATUS");
        info!("===========================================");

        for id in SubsystemId::all() {
            let state = self.get_status(id);
            let icon = match state {
                SubsystemStatus::Built => "✅",
                SubsystemStatus::NotRequested => "⏸️ ",
                SubsystemStatus::Skipped => "⏭️ ",
                SubsystemStatus::Failed => "❌",
                SubsystemStatus::Pending => "⏳",
            };
            info!("  {} {:20} {:?}", icon, id.name(), state);
        }

        info!("===========================================");
    }
}
