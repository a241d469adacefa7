//! Settle-once, read-many readiness.

use std::sync::Arc;

use tokio::sync::watch;

use super::SiteComponents;
use crate::error::SiteError;

pub(crate) type Settled = Result<Arc<SiteComponents>, SiteError>;

/// Holds `None` until initialization finishes, then the outcome forever.
///
/// Waiters that arrive after settling read the stored value directly.
#[derive(Debug)]
pub(crate) struct Readiness {
    slot: watch::Sender<Option<Settled>>,
}

impl Readiness {
    pub(crate) fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self { slot }
    }

    /// Store the outcome. Only the first call has any effect.
    pub(crate) fn settle(&self, outcome: Settled) -> bool {
        let mut outcome = Some(outcome);
        self.slot.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = outcome.take();
            true
        })
    }

    /// The outcome, if settled.
    pub(crate) fn peek(&self) -> Option<Settled> {
        self.slot.borrow().clone()
    }

    /// Wait for the outcome.
    pub(crate) async fn wait(&self) -> Settled {
        let mut receiver = self.slot.subscribe();
        let settled = receiver
            .wait_for(Option::is_some)
            .await
            .map_err(|_| SiteError::ReadinessClosed)?
            .clone();
        settled.unwrap_or(Err(SiteError::ReadinessClosed))
    }
}
