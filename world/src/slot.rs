//! State machine for a single hole in the play field.

use std::time::Duration;

use whack_core::{Event, SlotId, SlotSnapshot, SlotState, Tuning, Variant, WorldPoint};

use crate::schedule::{Schedule, TimerAction};

/// Collaborators a slot transition may schedule work on or report to.
pub(crate) struct SlotContext<'a> {
    /// Time the transition is anchored at.
    pub(crate) now: Duration,
    pub(crate) tuning: &'a Tuning,
    pub(crate) schedule: &'a mut Schedule,
    pub(crate) out: &'a mut Vec<Event>,
}

#[derive(Debug)]
pub(crate) struct Slot {
    id: SlotId,
    position: WorldPoint,
    variant: Variant,
    state: SlotState,
    actor_scale: f32,
}

impl Slot {
    pub(crate) fn new(id: SlotId, position: WorldPoint) -> Self {
        Self {
            id,
            position,
            variant: Variant::Friendly,
            state: SlotState::Hidden,
            actor_scale: 1.0,
        }
    }

    pub(crate) fn id(&self) -> SlotId {
        self.id
    }

    pub(crate) fn variant(&self) -> Variant {
        self.variant
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.state != SlotState::Hidden
    }

    pub(crate) fn is_hit(&self) -> bool {
        self.state == SlotState::Hit
    }

    /// Raises a target of the given variant; no-op while one is already up.
    pub(crate) fn show(
        &mut self,
        hide_after: Duration,
        variant: Variant,
        ctx: &mut SlotContext<'_>,
    ) -> bool {
        if self.is_visible() {
            return false;
        }

        self.variant = variant;
        self.actor_scale = 1.0;
        self.state = SlotState::Visible;

        let visible_for = ctx.tuning.visible_duration(hide_after);
        ctx.schedule.at(
            ctx.now.saturating_add(visible_for),
            TimerAction::HideSlot(self.id),
        );
        ctx.out.push(Event::SlotShown {
            slot: self.id,
            variant,
            visible_for,
        });
        true
    }

    /// Lowers the target; no-op when already hidden.
    pub(crate) fn hide(&mut self, out: &mut Vec<Event>) -> bool {
        if !self.is_visible() {
            return false;
        }

        self.state = SlotState::Hidden;
        out.push(Event::SlotHidden { slot: self.id });
        true
    }

    /// Marks a raised, unstruck target as hit and queues its retreat.
    pub(crate) fn register_hit(&mut self, ctx: &mut SlotContext<'_>) -> bool {
        if self.state != SlotState::Visible {
            return false;
        }

        self.state = SlotState::Hit;
        ctx.schedule.at(
            ctx.now.saturating_add(ctx.tuning.hit_retreat_delay()),
            TimerAction::RetreatSlot(self.id),
        );
        ctx.out.push(Event::SlotHit {
            slot: self.id,
            variant: self.variant,
        });
        true
    }

    /// Starts the shrinking retreat of a struck target.
    pub(crate) fn retreat(&mut self, ctx: &mut SlotContext<'_>) -> bool {
        if self.state != SlotState::Hit {
            return false;
        }

        let duration = ctx.tuning.hit_retreat_duration();
        ctx.schedule.at(
            ctx.now.saturating_add(duration),
            TimerAction::SettleSlot(self.id),
        );
        ctx.out.push(Event::SlotRetreating {
            slot: self.id,
            duration,
        });
        true
    }

    /// Completes the retreat; no-op when the slot already left the hit state.
    pub(crate) fn settle(&mut self, out: &mut Vec<Event>) -> bool {
        if self.state != SlotState::Hit {
            return false;
        }

        self.state = SlotState::Hidden;
        out.push(Event::SlotSettled { slot: self.id });
        true
    }

    pub(crate) fn shrink(&mut self, scale: f32) {
        self.actor_scale = scale;
    }

    pub(crate) fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            id: self.id,
            position: self.position,
            variant: self.variant,
            state: self.state,
            actor_scale: self.actor_scale,
        }
    }
}
