//! # Adapter Implementations
//!
//! Concrete implementations of the [`ports`](crate::ports). Only the
//! in-memory set ships with the runtime; production drivers live with the
//! application that embeds it.

pub mod memory;

pub use memory::{MemoryProbe, MemoryRealtimeServer, NamedMiddleware};
