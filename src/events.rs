//! Cross-context identity-change notifications.
//!
//! A single-topic publish/subscribe channel scoped to one browser profile.
//! The payload is empty: a notification only means "re-check now", so
//! delivery is at-least-once with no ordering guarantee beyond coming after
//! the write it reports. The publishing context receives its own
//! notifications, since the context that logs in must also react.

use tokio::sync::broadcast;
use tracing::trace;

/// Default number of in-flight notifications per subscriber.
pub const DEFAULT_BUS_CAPACITY: usize = 16;

/// The payload-free "identity changed" notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityChanged;

/// Shared notification channel. Clones publish to and subscribe from the
/// same topic.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    tx: broadcast::Sender<IdentityChanged>,
}

impl ChangeBus {
    /// Create a bus retaining up to `capacity` undelivered notifications
    /// per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Register a new listener. Only notifications published after this
    /// call are observed.
    #[must_use]
    pub fn subscribe(&self) -> ChangeListener {
        ChangeListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Notify every live listener, including ones in the publishing
    /// context. Publishing with no listeners is fine.
    pub fn publish(&self) {
        let delivered = self.tx.send(IdentityChanged).unwrap_or(0);
        trace!(listeners = delivered, "identity change published");
    }

    /// Number of live listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

/// Receiving end of the change bus.
#[derive(Debug)]
pub struct ChangeListener {
    rx: broadcast::Receiver<IdentityChanged>,
}

impl ChangeListener {
    /// Wait for the next notification.
    ///
    /// A lagged listener coalesces everything it missed into a single
    /// wake-up; because the payload is empty, losing intermediate
    /// notifications is harmless. Returns `false` once the bus is gone.
    pub async fn changed(&mut self) -> bool {
        match self.rx.recv().await {
            Ok(IdentityChanged) => true,
            Err(broadcast::error::RecvError::Lagged(_)) => true,
            Err(broadcast::error::RecvError::Closed) => false,
        }
    }

    /// Non-blocking check, draining anything already queued.
    pub fn try_changed(&mut self) -> bool {
        let mut seen = false;
        loop {
            match self.rx.try_recv() {
                Ok(IdentityChanged) | Err(broadcast::error::TryRecvError::Lagged(_)) => {
                    seen = true;
                }
                Err(_) => return seen,
            }
        }
    }
}
