#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure tapping system that resolves player taps into whack commands.

use whack_core::{Command, Event, SlotId, SlotView, WorldPoint};

/// Tapping system that translates a tap location into at most one whack.
#[derive(Debug, Default, Clone)]
pub struct Tapping {
    accepting: bool,
}

impl Tapping {
    /// Creates a new tapping system that ignores taps until a game starts.
    #[must_use]
    pub const fn new() -> Self {
        Self { accepting: false }
    }

    /// Consumes world events and the frame's tap to emit whack commands.
    ///
    /// The slot view must be captured after the provided events were applied
    /// so hidden and already struck targets are filtered out.
    pub fn handle(
        &mut self,
        events: &[Event],
        tap: Option<WorldPoint>,
        slots: &SlotView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::GameStarted => self.accepting = true,
                Event::GameOver { .. } => self.accepting = false,
                _ => {}
            }
        }

        if !self.accepting {
            return;
        }

        let Some(point) = tap else {
            return;
        };

        match target_at(slots, point) {
            Some(slot) => {
                log::debug!(
                    "tap at ({:.1}, {:.1}) hit slot {}",
                    point.x(),
                    point.y(),
                    slot.get()
                );
                out.push(Command::Whack { slot });
            }
            None => log::trace!("tap at ({:.1}, {:.1}) missed", point.x(), point.y()),
        }
    }
}

/// Finds the first whackable slot whose target bounds contain the point.
#[must_use]
pub fn target_at(slots: &SlotView, point: WorldPoint) -> Option<SlotId> {
    slots
        .iter()
        .find(|slot| slot.is_whackable() && slot.position.target_bounds().contains(point))
        .map(|slot| slot.id)
}
