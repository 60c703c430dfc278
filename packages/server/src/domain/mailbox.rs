//! Per-participant notification mailbox.
//!
//! A mailbox carries "room state changed" signals, not payloads. Delivery is
//! at-most-once and best-effort: a notification that cannot be queued within
//! the delivery timeout is dropped for that listener. A listener that misses
//! one signal still picks up the latest state on the next one, and every
//! connection starts with a full-state push, so nothing is retried.
//!
//! The mailbox holds at most one pending signal; further signals sent while
//! one is pending wait for the timeout and are then dropped.

use std::time::Duration;

use tokio::sync::mpsc::{self, error::SendTimeoutError};

/// How long a broadcast waits on a single mailbox before giving up.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_millis(100);

const MAILBOX_CAPACITY: usize = 1;

/// Create a connected sender/receiver pair.
pub fn mailbox() -> (MailboxSender, MailboxReceiver) {
    let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
    (MailboxSender { tx }, MailboxReceiver { rx })
}

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    TimedOut,
    Closed,
}

/// Sending half, owned by the participant. Clones are handed to broadcasts.
#[derive(Debug, Clone)]
pub struct MailboxSender {
    tx: mpsc::Sender<()>,
}

impl MailboxSender {
    /// Try to queue a notification, waiting at most `timeout`.
    pub async fn notify(&self, timeout: Duration) -> Delivery {
        match self.tx.send_timeout((), timeout).await {
            Ok(()) => Delivery::Delivered,
            Err(SendTimeoutError::Timeout(())) => Delivery::TimedOut,
            Err(SendTimeoutError::Closed(())) => Delivery::Closed,
        }
    }
}

/// Receiving half, owned by the connection's update waiter.
#[derive(Debug)]
pub struct MailboxReceiver {
    rx: mpsc::Receiver<()>,
}

impl MailboxReceiver {
    /// Wait for the next notification.
    ///
    /// Returns `None` once every sender is gone, i.e. the participant was
    /// closed or the connection was superseded.
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Discard notifications queued before anyone was listening.
    pub fn drain(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }
}
