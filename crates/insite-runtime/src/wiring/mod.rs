//! # Subsystem Wiring
//!
//! Decides, from the shape of [`SiteOptions`](crate::config::SiteOptions)
//! alone, which subsystems get built and in what order.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        SITE WIRING                                  │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                                                                     │
//! │  ┌──────────┐      ┌──────────┐                                     │
//! │  │ database │─────►│  config  │         ┌──────────┐                │
//! │  └────┬─────┘      └──────────┘         │ binding  │ (network.port) │
//! │       │                                 └────┬─────┘                │
//! │       │                           ┌──────────┴──────────┐           │
//! │       │                           ▼                     ▼           │
//! │       │                     ┌──────────┐          ┌──────────┐      │
//! │       │                     │ realtime │          │   http   │      │
//! │       │                     └────┬─────┘          └────┬─────┘      │
//! │       │         ┌────────────────┼───────────────┐     │            │
//! │       │         ▼                ▼               ▼     │            │
//! │       │   ┌──────────┐    ┌──────────┐    ┌──────────┐ │            │
//! │       │   │  subs    │    │ incoming │    │ outgoing │ │            │
//! │       │   └────┬─────┘    └────┬─────┘    └──────────┘ │            │
//! │       │        │               │                       │            │
//! │       ▼        ▼               ▼                       │            │
//! │  ┌─────────────────────────────────┐                   │            │
//! │  │  users_server (or plain users)  │                   │            │
//! │  └───────────────┬─────────────────┘                   │            │
//! │                  └──────────────┬──────────────────────┘            │
//! │                                 ▼                                   │
//! │                           ┌──────────┐                              │
//! │                           │  cookie  │                              │
//! │                           └──────────┘                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A dependent never pulls in its prerequisite: if `realtime` is absent,
//! every real-time dependent is skipped regardless of its own options.

mod resolver;

pub use resolver::{resolve, BuildPlan, BuildStep, MiddlewareSlot, PlannedStep};
