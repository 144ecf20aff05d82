//! Repeating timers with guaranteed cancellation.
//!
//! A `RepeatingTimer` is a spawned task that sends one message per period
//! into the app channel.  Dropping the handle aborts the task, so a timer can
//! never outlive the player that owns it.  `TimerSlot` keeps a timer in step
//! with an enabling condition (`is_playing`, debug overlay visible) and
//! numbers each timer it starts; a tick sent just before its timer was
//! aborted carries an old generation and is refused.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Period of both the progress timer and the debug clock.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Identifies one mounted player.  Ticks from an earlier mount are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MountId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Advances playback progress.
    Progress,
    /// Refreshes the debug overlay clock.
    Clock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    pub mount: MountId,
    pub kind: TimerKind,
    /// Which start of the slot produced this tick.
    pub generation: u64,
}

pub struct RepeatingTimer {
    handle: JoinHandle<()>,
}

impl RepeatingTimer {
    /// First message arrives one `period` after the call, like `setInterval`.
    pub fn spawn<M, F>(period: Duration, tx: mpsc::Sender<M>, make: F) -> Self
    where
        M: Send + 'static,
        F: Fn() -> M + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(make()).await.is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }
}

impl Drop for RepeatingTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Holds at most one timer and starts or cancels it to match a condition.
#[derive(Default)]
pub struct TimerSlot {
    timer: Option<RepeatingTimer>,
    generation: u64,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// `start` receives the generation number of the timer it creates.
    pub fn sync(&mut self, enabled: bool, start: impl FnOnce(u64) -> RepeatingTimer) {
        match (enabled, self.timer.is_some()) {
            (true, false) => {
                self.generation += 1;
                self.timer = Some(start(self.generation));
            }
            (false, true) => self.timer = None,
            _ => {}
        }
    }

    pub fn cancel(&mut self) {
        self.timer = None;
    }

    /// True only for ticks of the timer currently running in this slot.
    pub fn accepts(&self, generation: u64) -> bool {
        self.timer.is_some() && generation == self.generation
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }
}

/// Spawn a 1 Hz timer that emits `TimerTick`s wrapped by `wrap`.
pub fn tick_timer<M, W>(tx: mpsc::Sender<M>, tick: TimerTick, wrap: W) -> RepeatingTimer
where
    M: Send + 'static,
    W: Fn(TimerTick) -> M + Send + 'static,
{
    RepeatingTimer::spawn(TICK_PERIOD, tx, move || wrap(tick))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick() -> TimerTick {
        TimerTick {
            mount: MountId(1),
            kind: TimerKind::Progress,
            generation: 1,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let (tx, mut rx) = mpsc::channel(8);
        let _timer = tick_timer(tx, tick(), |t| t);

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.recv().await, Some(tick()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (tx, mut rx) = mpsc::channel(8);
        let timer = tick_timer(tx, tick(), |t| t);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(rx.recv().await.is_some());

        drop(timer);
        tokio::time::sleep(Duration::from_secs(5)).await;
        // the only sender lived in the aborted task
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slot_follows_condition() {
        let (tx, mut rx) = mpsc::channel::<TimerTick>(8);
        let mut slot = TimerSlot::new();
        let mut started = 0;

        for enabled in [true, true, true] {
            slot.sync(enabled, |_| {
                started += 1;
                tick_timer(tx.clone(), tick(), |t| t)
            });
        }
        assert_eq!(started, 1);
        assert!(slot.is_active());

        slot.sync(false, |_| unreachable!());
        assert!(!slot.is_active());
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(rx.try_recv().is_err());

        slot.sync(true, |_| tick_timer(tx.clone(), tick(), |t| t));
        slot.cancel();
        assert!(!slot.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_bumps_generation() {
        let (tx, _rx) = mpsc::channel::<TimerTick>(8);
        let mut slot = TimerSlot::new();
        let mut seen = Vec::new();
        for enabled in [true, false, true] {
            slot.sync(enabled, |generation| {
                seen.push(generation);
                tick_timer(tx.clone(), tick(), |t| t)
            });
        }
        assert_eq!(seen, vec![1, 2]);
        assert!(!slot.accepts(1));
        assert!(slot.accepts(2));

        slot.cancel();
        assert!(!slot.accepts(2));
    }
}
