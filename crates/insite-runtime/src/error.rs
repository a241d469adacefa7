//! Error types for site construction.

use thiserror::Error;

use crate::registry::SubsystemId;

/// A collaborator failed to build its subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{subsystem} failed: {message}")]
pub struct CollaboratorError {
    pub subsystem: SubsystemId,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(subsystem: SubsystemId, message: impl Into<String>) -> Self {
        Self {
            subsystem,
            message: message.into(),
        }
    }
}

/// Errors surfaced by a [`Site`](crate::Site).
///
/// `Clone` so settled readiness can hand the same failure to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SiteError {
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// The runtime build disagreed with the statically projected shape.
    #[error("{subsystem} was expected to be {}, but was {}", presence(*.expected), presence(!*.expected))]
    ShapeMismatch {
        subsystem: SubsystemId,
        expected: bool,
    },

    /// Readiness can no longer settle.
    #[error("site readiness channel closed")]
    ReadinessClosed,
}

fn presence(built: bool) -> &'static str {
    if built {
        "built"
    } else {
        "absent"
    }
}

impl SiteError {
    /// The subsystem this error concerns, if any.
    #[must_use]
    pub fn subsystem(&self) -> Option<SubsystemId> {
        match self {
            Self::Collaborator(e) => Some(e.subsystem),
            Self::ShapeMismatch { subsystem, .. } => Some(*subsystem),
            Self::ReadinessClosed => None,
        }
    }
}
