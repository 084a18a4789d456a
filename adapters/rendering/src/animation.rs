//! Actor animations driven by world events.
//!
//! Every slot owns a queue of [`ActorAction`]s that run one after another.
//! Leftover frame time carries over into the next action so a long frame
//! completes several actions at once.

use std::{
    collections::{BTreeMap, VecDeque},
    time::Duration,
};

use whack_core::{Event, SlotId, Tuning, Variant};

/// Distance an actor travels when rising out of or sinking into its hole.
pub const RISE_DISTANCE: f32 = 80.0;

/// Duration of the quick rise and sink animations.
pub const REVEAL_DURATION: Duration = Duration::from_millis(50);

/// Single step of an actor animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActorAction {
    /// Moves the actor vertically by `delta` over `duration`.
    MoveBy {
        /// Signed rise change; positive values lift the actor.
        delta: f32,
        /// Total duration of the movement.
        duration: Duration,
        /// Time already spent on the movement.
        elapsed: Duration,
    },
    /// Sets the actor scale instantly.
    ScaleTo {
        /// Target scale.
        scale: f32,
    },
    /// Pauses the queue.
    Wait {
        /// Remaining pause.
        remaining: Duration,
    },
}

impl ActorAction {
    /// Creates a movement that has not started yet.
    #[must_use]
    pub const fn move_by(delta: f32, duration: Duration) -> Self {
        Self::MoveBy {
            delta,
            duration,
            elapsed: Duration::ZERO,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Actor {
    rise: f32,
    scale: f32,
    queue: VecDeque<ActorAction>,
}

impl Default for Actor {
    fn default() -> Self {
        Self {
            rise: 0.0,
            scale: 1.0,
            queue: VecDeque::new(),
        }
    }
}

impl Actor {
    /// Runs queued actions for `dt`, returning whether the queue drained.
    fn advance(&mut self, dt: Duration) -> bool {
        if self.queue.is_empty() {
            return false;
        }

        let mut budget = dt;
        while let Some(action) = self.queue.front_mut() {
            match action {
                ActorAction::ScaleTo { scale } => {
                    self.scale = *scale;
                    let _ = self.queue.pop_front();
                }
                ActorAction::Wait { remaining } => {
                    if budget < *remaining {
                        *remaining -= budget;
                        return false;
                    }
                    budget -= *remaining;
                    let _ = self.queue.pop_front();
                }
                ActorAction::MoveBy {
                    delta,
                    duration,
                    elapsed,
                } => {
                    let left = duration.saturating_sub(*elapsed);
                    let step = budget.min(left);
                    let before = progress(*elapsed, *duration);
                    *elapsed += step;
                    let after = progress(*elapsed, *duration);
                    self.rise = (self.rise + *delta * (after - before)).clamp(0.0, RISE_DISTANCE);
                    budget -= step;

                    if *elapsed < *duration {
                        return false;
                    }
                    let _ = self.queue.pop_front();
                }
            }
        }

        true
    }
}

fn progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
}

/// Turns slot events into per-actor animation queues.
#[derive(Clone, Debug)]
pub struct ActorAnimator {
    enemy_hit_scale: f32,
    hit_wait: Duration,
    actors: BTreeMap<SlotId, Actor>,
}

impl ActorAnimator {
    /// Creates an animator matching the provided tuning.
    #[must_use]
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            enemy_hit_scale: tuning.enemy_hit_scale,
            hit_wait: tuning.hit_retreat_delay(),
            actors: BTreeMap::new(),
        }
    }

    /// Queues animations for the provided world events.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::SlotsConfigured { .. } | Event::GameStarted => {
                    for actor in self.actors.values_mut() {
                        *actor = Actor::default();
                    }
                }
                Event::SlotShown { slot, .. } => {
                    self.enqueue(*slot, ActorAction::ScaleTo { scale: 1.0 });
                    self.enqueue(*slot, ActorAction::move_by(RISE_DISTANCE, REVEAL_DURATION));
                }
                Event::SlotHidden { slot } => {
                    self.enqueue(*slot, ActorAction::move_by(-RISE_DISTANCE, REVEAL_DURATION));
                }
                Event::SlotHit { slot, variant } => {
                    if *variant == Variant::Enemy {
                        let scale = self.enemy_hit_scale;
                        self.enqueue(*slot, ActorAction::ScaleTo { scale });
                    }
                    let remaining = self.hit_wait;
                    self.enqueue(*slot, ActorAction::Wait { remaining });
                }
                Event::SlotRetreating { slot, duration } => {
                    self.enqueue(*slot, ActorAction::move_by(-RISE_DISTANCE, *duration));
                }
                _ => {}
            }
        }
    }

    /// Advances every actor, returning the slots whose animations completed.
    pub fn advance(&mut self, dt: Duration) -> Vec<SlotId> {
        self.actors
            .iter_mut()
            .filter_map(|(slot, actor)| actor.advance(dt).then_some(*slot))
            .collect()
    }

    /// Current rise of the actor, zero when it never moved.
    #[must_use]
    pub fn rise(&self, slot: SlotId) -> f32 {
        self.actors.get(&slot).map_or(0.0, |actor| actor.rise)
    }

    /// Current scale of the actor.
    #[must_use]
    pub fn scale(&self, slot: SlotId) -> f32 {
        self.actors.get(&slot).map_or(1.0, |actor| actor.scale)
    }

    fn enqueue(&mut self, slot: SlotId, action: ActorAction) {
        self.actors.entry(slot).or_default().queue.push_back(action);
    }
}
