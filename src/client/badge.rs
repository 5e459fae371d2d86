//! Task badge counter.

use crate::types::Event;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, broadcast};

/// Display-only counter of tasks submitted in the current burst
///
/// Every successful submission bumps the counter and restarts the reset timer;
/// once `reset_after` passes without another submission the counter drops back
/// to zero. Each change is broadcast as [`Event::BadgeChanged`].
#[derive(Clone)]
pub struct TaskBadge {
    /// Latest value, readable without the lock; written only while holding `generation`
    count: Arc<AtomicU64>,
    /// Bumped on every increment so stale reset timers can tell they lost
    generation: Arc<Mutex<u64>>,
    event_tx: broadcast::Sender<Event>,
}

impl TaskBadge {
    pub(crate) fn new(event_tx: broadcast::Sender<Event>) -> Self {
        Self {
            count: Arc::new(AtomicU64::new(0)),
            generation: Arc::new(Mutex::new(0)),
            event_tx,
        }
    }

    /// Current counter value (0 = cleared)
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    /// Increment the counter and schedule the reset
    pub(crate) async fn increment(&self, reset_after: Duration) -> u64 {
        let (count, generation) = {
            let mut generation = self.generation.lock().await;
            *generation += 1;
            let count = self.count.fetch_add(1, Ordering::SeqCst) + 1;
            self.event_tx.send(Event::BadgeChanged { count }).ok();
            (count, *generation)
        };

        let badge = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(reset_after).await;
            badge.reset_if_current(generation).await;
        });

        count
    }

    async fn reset_if_current(&self, generation: u64) {
        let current = self.generation.lock().await;
        if *current != generation {
            return;
        }
        self.count.store(0, Ordering::SeqCst);
        self.event_tx.send(Event::BadgeChanged { count: 0 }).ok();
        tracing::trace!("Task badge cleared");
    }
}
