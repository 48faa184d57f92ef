//! Timer seam between the controller and whatever drives it.

use std::collections::HashMap;
use std::time::Duration;

use futures::StreamExt;
use tokio_util::time::DelayQueue;
use tokio_util::time::delay_queue::Key;
use tracing::warn;

/// Longest delay a timer accepts. `DelayQueue` cannot hold deadlines much
/// past two years, so anything longer is clamped to this.
pub const MAX_DELAY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// The three timers the slideshow arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Advance to the next slide.
    RotationTick,
    /// Fetch the feed again.
    FeedRefresh,
    /// Tear everything down and start over.
    DocumentReload,
}

/// Handle to one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// One-shot timers. Repeating behaviour is the caller re-arming on fire.
pub trait Scheduler {
    fn schedule(&mut self, timer: Timer, after: Duration) -> TimerId;

    /// Cancels `id`. Returns `false` if it already fired or was cancelled.
    fn cancel(&mut self, id: TimerId) -> bool;
}

/// [`Scheduler`] backed by the tokio timer wheel.
#[derive(Debug, Default)]
pub struct TimerQueue {
    queue: DelayQueue<(TimerId, Timer)>,
    keys: HashMap<TimerId, Key>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of armed timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.keys.len()
    }

    /// Waits for the next timer to fire.
    ///
    /// Resolves to `None` immediately when nothing is armed.
    pub async fn next_expired(&mut self) -> Option<(TimerId, Timer)> {
        let expired = self.queue.next().await?;
        let (id, timer) = expired.into_inner();
        self.keys.remove(&id);
        Some((id, timer))
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, timer: Timer, after: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        if after > MAX_DELAY {
            warn!(?timer, requested = ?after, "timer delay clamped");
        }
        let key = self.queue.insert((id, timer), after.min(MAX_DELAY));
        self.keys.insert(id, key);
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        match self.keys.remove(&id) {
            Some(key) => self.queue.try_remove(&key).is_some(),
            None => false,
        }
    }
}
