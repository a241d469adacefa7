//! # Site Events
//!
//! Defines every event a `Site` surfaces to its observers: subsystem
//! construction outcomes, readiness, and real-time server lifecycle.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// All events that can be published to the site bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteEvent {
    // =========================================================================
    // LIFECYCLE
    // =========================================================================
    /// A subsystem was constructed and attached to the site.
    SubsystemBuilt {
        /// Stable field name of the subsystem.
        subsystem: String,
        /// Time spent in the builder, in milliseconds.
        elapsed_ms: u64,
    },

    /// A subsystem was requested but its preconditions did not hold.
    SubsystemSkipped {
        /// Stable field name of the subsystem.
        subsystem: String,
        /// Why it was not built.
        reason: String,
    },

    /// Every planned subsystem is built; readiness has settled.
    SiteReady {
        /// Field names of the built subsystems, in build order.
        built: Vec<String>,
    },

    /// A builder failed; initialization stopped.
    SiteFailed {
        /// Stable field name of the failing subsystem.
        subsystem: String,
        /// Error message reported by the collaborator.
        error: String,
    },

    // =========================================================================
    // REAL-TIME SERVER
    // =========================================================================
    /// A real-time client connected.
    RealtimeConnected {
        /// Connection identifier assigned by the real-time server.
        connection_id: Uuid,
        /// Email of the authenticated user, if the session carries one.
        user: Option<String>,
    },

    /// The real-time server reported an error.
    RealtimeError {
        /// Error description.
        message: String,
    },

    /// The real-time server closed.
    RealtimeClosed,
}

impl SiteEvent {
    /// Get the topic for this event (used for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::SubsystemBuilt { .. }
            | Self::SubsystemSkipped { .. }
            | Self::SiteReady { .. }
            | Self::SiteFailed { .. } => EventTopic::Lifecycle,
            Self::RealtimeConnected { .. } | Self::RealtimeError { .. } | Self::RealtimeClosed => {
                EventTopic::Realtime
            }
        }
    }

    /// The subsystem this event concerns, if it names one.
    #[must_use]
    pub fn subsystem(&self) -> Option<&str> {
        match self {
            Self::SubsystemBuilt { subsystem, .. }
            | Self::SubsystemSkipped { subsystem, .. }
            | Self::SiteFailed { subsystem, .. } => Some(subsystem),
            Self::RealtimeConnected { .. } | Self::RealtimeError { .. } | Self::RealtimeClosed => {
                Some("realtime")
            }
            Self::SiteReady { .. } => None,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Construction and readiness events.
    Lifecycle,
    /// Real-time server events.
    Realtime,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Subsystems to include. Empty means all subsystems.
    pub subsystems: Vec<String>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            subsystems: Vec::new(),
        }
    }

    /// Create a filter for events concerning specific subsystems.
    #[must_use]
    pub fn for_subsystems<I, S>(subsystems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topics: Vec::new(),
            subsystems: subsystems.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &SiteEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let subsystem_match = self.subsystems.is_empty()
            || event
                .subsystem()
                .is_some_and(|name| self.subsystems.iter().any(|s| s == name));

        topic_match && subsystem_match
    }
}
