//! Cross-crate integration scenarios.

pub mod flows;
pub mod ports;
pub mod readiness;
