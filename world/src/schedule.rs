//! One-shot timer queue driving every delayed transition in the world.

use std::time::Duration;

use whack_core::SlotId;

/// Deferred work carried by a timer. Each action only names the data it needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TimerAction {
    /// The next spawn wave is due.
    SpawnWave,
    /// A revealed slot reached the end of its visible period.
    HideSlot(SlotId),
    /// A struck slot finished its pause and starts retreating.
    RetreatSlot(SlotId),
    /// A struck slot finished retreating.
    SettleSlot(SlotId),
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Timer {
    pub(crate) due: Duration,
    pub(crate) action: TimerAction,
}

/// Timers ordered by due time; timers sharing a due time fire in insertion order.
#[derive(Debug, Default)]
pub(crate) struct Schedule {
    now: Duration,
    pending: Vec<Timer>,
}

impl Schedule {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Current simulated time.
    pub(crate) fn now(&self) -> Duration {
        self.now
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    /// Queues `action` to fire at the absolute time `due`.
    pub(crate) fn at(&mut self, due: Duration, action: TimerAction) {
        let index = self.pending.partition_point(|timer| timer.due <= due);
        self.pending.insert(index, Timer { due, action });
    }

    /// Queues `action` to fire `delay` after the current time.
    pub(crate) fn after(&mut self, delay: Duration, action: TimerAction) {
        self.at(self.now.saturating_add(delay), action);
    }

    /// Removes the earliest timer due no later than `until`, moving the clock to its due time.
    pub(crate) fn pop_due(&mut self, until: Duration) -> Option<Timer> {
        let first = self.pending.first()?;
        if first.due > until {
            return None;
        }

        let timer = self.pending.remove(0);
        self.now = self.now.max(timer.due);
        Some(timer)
    }

    /// Moves the clock forward once every due timer fired.
    pub(crate) fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Drops every pending timer; used only when a new game starts.
    pub(crate) fn clear(&mut self) {
        self.pending.clear();
    }
}
