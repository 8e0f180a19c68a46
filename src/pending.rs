//! Deferred completions for presentations that finish after user interaction.
//!
//! Each presentation gets its own [`RequestId`]. The backend holds the
//! [`Completion`] and the dispatcher awaits the matching [`PendingOutcome`],
//! so any number of requests can be outstanding without one replacing
//! another's result.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::channel::Channel;
use crate::models::ShareOutcome;

const DISMISSED_MESSAGE: &str = "Share was dismissed without a result";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Registry of outstanding completions, keyed by request.
#[derive(Default)]
pub struct PendingCompletions {
    slots: Mutex<HashMap<RequestId, oneshot::Sender<ShareOutcome>>>,
}

impl PendingCompletions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a slot for one request.
    pub fn register(self: &Arc<Self>, channel: Channel) -> (Completion, PendingOutcome) {
        let id = RequestId::new();
        let (tx, rx) = oneshot::channel();
        self.slots().insert(id, tx);
        log::debug!("registered pending {channel} share {id}");
        (
            Completion {
                id,
                channel,
                registry: Arc::clone(self),
                finished: false,
            },
            PendingOutcome { id, channel, rx },
        )
    }

    /// Number of requests still waiting for a result.
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn resolve(&self, id: RequestId, outcome: ShareOutcome) -> bool {
        let Some(tx) = self.slots().remove(&id) else {
            return false;
        };
        tx.send(outcome).is_ok()
    }

    fn forget(&self, id: RequestId) {
        // Dropping the sender wakes the waiter with a dismissal.
        self.slots().remove(&id);
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<RequestId, oneshot::Sender<ShareOutcome>>> {
        match self.slots.lock() {
            Ok(slots) => slots,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// The backend's half: finishing it delivers the outcome to exactly the
/// request that created it. Dropping it unfinished reports a dismissal.
pub struct Completion {
    id: RequestId,
    channel: Channel,
    registry: Arc<PendingCompletions>,
    finished: bool,
}

impl Completion {
    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn finish(mut self, outcome: ShareOutcome) {
        self.finished = true;
        if !self.registry.resolve(self.id, outcome) {
            log::debug!("share {} finished after its caller went away", self.id);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if !self.finished {
            self.registry.forget(self.id);
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .finish()
    }
}

/// The dispatcher's half.
pub struct PendingOutcome {
    id: RequestId,
    channel: Channel,
    rx: oneshot::Receiver<ShareOutcome>,
}

impl PendingOutcome {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Waits for the user to finish. There is no timeout.
    pub async fn wait(self) -> ShareOutcome {
        match self.rx.await {
            Ok(outcome) => outcome,
            Err(_) => ShareOutcome::failure(self.channel.id(), DISMISSED_MESSAGE),
        }
    }
}
