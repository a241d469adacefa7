//! # InSite Bus - Lifecycle Events for a Composite Site
//!
//! A `Site` owns every subsystem it builds and is responsible for surfacing
//! their lifecycle to its own observers. This crate is the channel it uses.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Orchestrator │                    │   Observer   │
//! │   builders   │    publish()       │ (logs, UI,   │
//! │   realtime   │ ──────┐            │  tests)      │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │   Site Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Informational events (a real-time connection, a closed server) travel
//! here and never through the error path.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, SiteEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
