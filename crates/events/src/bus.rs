//! In-memory pub/sub for ledger events.

use std::sync::{Mutex, mpsc};

use crate::event::LedgerEvent;

/// In-memory fan-out bus.
///
/// - No IO / no async
/// - Best-effort: publishing never fails the originating ledger operation
/// - At-least-once acceptable (subscribers must be idempotent)
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<mpsc::Sender<LedgerEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fan the event out to live subscribers, dropping any that have gone
    /// away.
    pub fn publish(&self, event: LedgerEvent) {
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned, we still return a subscription;
        // it just won't receive messages until the process restarts.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription { rx }
    }
}

/// Receiving side of a subscription.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::Receiver<LedgerEvent>,
}

impl Subscription {
    /// Next event, if one is already queued.
    pub fn try_recv(&self) -> Option<LedgerEvent> {
        self.rx.try_recv().ok()
    }

    /// Block until the next event or until every publisher is gone.
    pub fn recv(&self) -> Option<LedgerEvent> {
        self.rx.recv().ok()
    }

    /// Drain everything currently queued.
    pub fn drain(&self) -> Vec<LedgerEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }
}
