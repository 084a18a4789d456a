#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Whack-a-Penguin.
//!
//! The world owns every slot, the round controller and the timer queue. It is
//! mutated exclusively through [`apply`] and observed through [`query`].
//! Randomness never enters the world: spawn decisions arrive pre-drawn inside
//! [`Command::SpawnWave`], which keeps replays exact.

mod schedule;
mod slot;

use std::time::Duration;

use whack_core::{
    Command, Cue, Event, GamePhase, SlotId, Tuning, Variant, WavePlan, WorldPoint, WELCOME_BANNER,
};

use self::{
    schedule::{Schedule, TimerAction},
    slot::{Slot, SlotContext},
};

/// Represents the authoritative Whack-a-Penguin world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    tuning: Tuning,
    slots: Vec<Slot>,
    wave_order: Vec<SlotId>,
    schedule: Schedule,
    phase: GamePhase,
    round: u32,
    spawn_interval: Duration,
    score: i64,
    wave_epoch: Option<Duration>,
    resume_at: Option<Duration>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates a new world using the classic tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tuning(Tuning::default())
    }

    /// Creates a new world using the provided tuning.
    #[must_use]
    pub fn with_tuning(tuning: Tuning) -> Self {
        let spawn_interval = tuning.initial_spawn_interval();
        Self {
            banner: WELCOME_BANNER,
            tuning,
            slots: Vec::new(),
            wave_order: Vec::new(),
            schedule: Schedule::new(),
            phase: GamePhase::Idle,
            round: 0,
            spawn_interval,
            score: 0,
            wave_epoch: None,
            resume_at: None,
        }
    }

    fn configure_slots(&mut self, positions: Vec<WorldPoint>, out_events: &mut Vec<Event>) {
        self.slots = positions
            .into_iter()
            .enumerate()
            .map(|(index, position)| Slot::new(SlotId::new(index as u32), position))
            .collect();
        self.wave_order = self.slots.iter().map(Slot::id).collect();
        out_events.push(Event::SlotsConfigured {
            count: self.slots.len(),
        });
    }

    fn start(&mut self, out_events: &mut Vec<Event>) {
        self.schedule.clear();
        if let Some(horizon) = self.resume_at.take() {
            self.schedule.settle(horizon);
        }
        for slot in &mut self.slots {
            let _ = slot.hide(out_events);
        }

        self.phase = GamePhase::Running;
        self.round = 0;
        self.spawn_interval = self.tuning.initial_spawn_interval();
        self.wave_epoch = None;
        self.schedule
            .after(self.tuning.first_wave_delay(), TimerAction::SpawnWave);

        log::info!("game started with {} slots", self.slots.len());
        out_events.push(Event::GameStarted);
        let previous = self.score;
        self.set_score(0, -previous, out_events);
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let from = self.resume_at.take().unwrap_or_else(|| self.schedule.now());
        out_events.push(Event::TimeAdvanced { dt });
        self.run_until(from.saturating_add(dt), out_events);
    }

    /// Fires due timers up to `horizon`.
    ///
    /// A due wave suspends the clock at its epoch until the plan arrives, so
    /// the plan observes the slots as they were at that instant.
    fn run_until(&mut self, horizon: Duration, out_events: &mut Vec<Event>) {
        while let Some(timer) = self.schedule.pop_due(horizon) {
            if self.fire(timer.action, out_events) {
                self.resume_at = Some(horizon);
                return;
            }
        }
        self.schedule.settle(horizon);
    }

    fn resume(&mut self, out_events: &mut Vec<Event>) {
        if let Some(horizon) = self.resume_at.take() {
            self.run_until(horizon, out_events);
        }
    }

    /// Runs a timer action, returning whether a wave became due.
    fn fire(&mut self, action: TimerAction, out_events: &mut Vec<Event>) -> bool {
        let now = self.schedule.now();
        match action {
            TimerAction::SpawnWave => {
                if self.phase != GamePhase::Running {
                    return false;
                }
                self.wave_epoch = Some(now);
                out_events.push(Event::WaveDue { round: self.round });
                return true;
            }
            TimerAction::HideSlot(id) => {
                if let Some(slot) = slot_mut(&mut self.slots, id) {
                    let _ = slot.hide(out_events);
                }
            }
            TimerAction::RetreatSlot(id) => {
                if let Some(slot) = slot_mut(&mut self.slots, id) {
                    let mut ctx = SlotContext {
                        now,
                        tuning: &self.tuning,
                        schedule: &mut self.schedule,
                        out: out_events,
                    };
                    let _ = slot.retreat(&mut ctx);
                }
            }
            TimerAction::SettleSlot(id) => {
                if let Some(slot) = slot_mut(&mut self.slots, id) {
                    let _ = slot.settle(out_events);
                }
            }
        }
        false
    }

    fn spawn_wave(&mut self, plan: WavePlan, out_events: &mut Vec<Event>) {
        match self.phase {
            GamePhase::Over => {
                log::debug!("ignoring spawn wave after game over");
                return;
            }
            GamePhase::Idle => self.phase = GamePhase::Running,
            GamePhase::Running => {}
        }

        let epoch = self
            .wave_epoch
            .take()
            .unwrap_or_else(|| self.schedule.now());
        self.round = self.round.saturating_add(1);

        if self.round >= self.tuning.round_limit {
            self.finish(out_events);
            return;
        }

        self.spawn_interval = self.tuning.decayed(self.spawn_interval);
        if is_permutation_of(&plan.order, &self.wave_order) {
            self.wave_order = plan.order;
        }

        let hide_after = self.spawn_interval;
        let mut revealed = 0;
        for reveal in plan.reveals {
            let Some(slot) = slot_mut(&mut self.slots, reveal.slot) else {
                continue;
            };
            let mut ctx = SlotContext {
                now: epoch,
                tuning: &self.tuning,
                schedule: &mut self.schedule,
                out: out_events,
            };
            if slot.show(hide_after, reveal.variant, &mut ctx) {
                revealed += 1;
            }
        }

        self.schedule.at(
            epoch.saturating_add(plan.next_wave_in),
            TimerAction::SpawnWave,
        );

        log::debug!(
            "wave {} revealed {revealed} slot(s), interval {:.3}s, next in {:.3}s",
            self.round,
            self.spawn_interval.as_secs_f64(),
            plan.next_wave_in.as_secs_f64(),
        );
        out_events.push(Event::WaveSpawned {
            round: self.round,
            spawn_interval: self.spawn_interval,
            revealed,
        });
    }

    fn finish(&mut self, out_events: &mut Vec<Event>) {
        for slot in &mut self.slots {
            let _ = slot.hide(out_events);
        }
        self.phase = GamePhase::Over;

        log::info!("game over after {} rounds, score {}", self.round, self.score);
        out_events.push(Event::GameOver {
            score: self.score,
            rounds: self.round,
        });
    }

    fn whack(&mut self, id: SlotId, out_events: &mut Vec<Event>) {
        if self.phase != GamePhase::Running {
            return;
        }

        let now = self.schedule.now();
        let Some(slot) = slot_mut(&mut self.slots, id) else {
            return;
        };
        if !slot.is_visible() || slot.is_hit() {
            return;
        }

        let variant = slot.variant();
        if variant == Variant::Enemy {
            slot.shrink(self.tuning.enemy_hit_scale);
        }

        let mut ctx = SlotContext {
            now,
            tuning: &self.tuning,
            schedule: &mut self.schedule,
            out: out_events,
        };
        if !slot.register_hit(&mut ctx) {
            return;
        }

        let (delta, cue) = match variant {
            Variant::Enemy => (self.tuning.enemy_reward, Cue::Whack),
            Variant::Friendly => (-self.tuning.friendly_penalty, Cue::WhackBad),
        };
        log::debug!("slot {} struck ({variant:?}), score {delta:+}", id.get());
        let score = self.score.saturating_add(delta);
        self.set_score(score, delta, out_events);
        out_events.push(Event::CueRequested { cue });
    }

    fn set_score(&mut self, score: i64, delta: i64, out_events: &mut Vec<Event>) {
        self.score = score;
        out_events.push(Event::ScoreChanged { score, delta });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureSlots { positions } => world.configure_slots(positions, out_events),
        Command::StartGame => world.start(out_events),
        Command::Tick { dt } => world.advance(dt, out_events),
        Command::SpawnWave { plan } => {
            world.spawn_wave(plan, out_events);
            world.resume(out_events);
        }
        Command::Whack { slot } => world.whack(slot, out_events),
    }
}

fn slot_mut(slots: &mut [Slot], id: SlotId) -> Option<&mut Slot> {
    slots.iter_mut().find(|slot| slot.id() == id)
}

fn is_permutation_of(candidate: &[SlotId], reference: &[SlotId]) -> bool {
    if candidate.len() != reference.len() {
        return false;
    }

    let mut lhs = candidate.to_vec();
    let mut rhs = reference.to_vec();
    lhs.sort_unstable();
    rhs.sort_unstable();
    lhs == rhs
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use whack_core::{GamePhase, RoundSnapshot, SlotId, SlotSnapshot, SlotView, Tuning};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Tuning the world was created with.
    #[must_use]
    pub fn tuning(world: &World) -> &Tuning {
        &world.tuning
    }

    /// Captures a read-only view of every slot.
    #[must_use]
    pub fn slot_view(world: &World) -> SlotView {
        SlotView::from_snapshots(world.slots.iter().map(|slot| slot.snapshot()).collect())
    }

    /// Captures a single slot, if it exists.
    #[must_use]
    pub fn slot(world: &World, id: SlotId) -> Option<SlotSnapshot> {
        world
            .slots
            .iter()
            .find(|slot| slot.id() == id)
            .map(|slot| slot.snapshot())
    }

    /// Slot order produced by the most recent shuffle.
    #[must_use]
    pub fn wave_order(world: &World) -> &[SlotId] {
        &world.wave_order
    }

    /// Current score.
    #[must_use]
    pub fn score(world: &World) -> i64 {
        world.score
    }

    /// Waves counted so far.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.round
    }

    /// Spawn interval that the next wave will decay.
    #[must_use]
    pub fn spawn_interval(world: &World) -> Duration {
        world.spawn_interval
    }

    /// Current game phase.
    #[must_use]
    pub fn phase(world: &World) -> GamePhase {
        world.phase
    }

    /// Round state bundled for the spawning system.
    #[must_use]
    pub fn round_snapshot(world: &World) -> RoundSnapshot {
        RoundSnapshot {
            round: world.round,
            spawn_interval: world.spawn_interval,
            phase: world.phase,
        }
    }

    /// Number of timers waiting to fire.
    #[must_use]
    pub fn pending_timers(world: &World) -> usize {
        world.schedule.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whack_core::Reveal;

    fn configured_world(count: u32) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureSlots {
                positions: (0..count)
                    .map(|index| WorldPoint::new(100.0 + index as f32 * 170.0, 358.0))
                    .collect(),
            },
            &mut events,
        );
        world
    }

    #[test]
    fn configure_slots_assigns_sequential_identifiers() {
        let world = configured_world(4);
        let ids = query::slot_view(&world).ids();

        assert_eq!(ids, (0..4).map(SlotId::new).collect::<Vec<_>>());
        assert_eq!(query::wave_order(&world), ids.as_slice());
    }

    #[test]
    fn start_schedules_first_wave_after_delay() {
        let mut world = configured_world(4);
        let mut events = Vec::new();
        apply(&mut world, Command::StartGame, &mut events);
        assert_eq!(
            events,
            vec![
                Event::GameStarted,
                Event::ScoreChanged { score: 0, delta: 0 }
            ]
        );

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(999),
            },
            &mut events,
        );
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::WaveDue { .. })));

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(1),
            },
            &mut events,
        );
        assert!(events.contains(&Event::WaveDue { round: 0 }));
    }

    #[test]
    fn wave_ignores_plan_order_that_is_not_a_permutation() {
        let mut world = configured_world(3);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnWave {
                plan: WavePlan {
                    order: vec![SlotId::new(0), SlotId::new(0), SlotId::new(9)],
                    reveals: vec![Reveal::new(SlotId::new(2), Variant::Enemy)],
                    next_wave_in: Duration::from_secs(1),
                },
            },
            &mut events,
        );

        assert_eq!(
            query::wave_order(&world),
            &[SlotId::new(0), SlotId::new(1), SlotId::new(2)]
        );
        assert!(query::slot(&world, SlotId::new(2))
            .expect("slot exists")
            .is_visible());
    }

    #[test]
    fn restart_resets_score_and_hides_slots() {
        let mut world = configured_world(2);
        let mut events = Vec::new();
        apply(&mut world, Command::StartGame, &mut events);
        apply(
            &mut world,
            Command::SpawnWave {
                plan: WavePlan {
                    order: vec![SlotId::new(1), SlotId::new(0)],
                    reveals: vec![Reveal::new(SlotId::new(1), Variant::Friendly)],
                    next_wave_in: Duration::from_secs(1),
                },
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Whack {
                slot: SlotId::new(1),
            },
            &mut events,
        );
        assert_eq!(query::score(&world), -5);

        events.clear();
        apply(&mut world, Command::StartGame, &mut events);

        assert_eq!(query::score(&world), 0);
        assert_eq!(query::round(&world), 0);
        assert!(events.contains(&Event::ScoreChanged { score: 0, delta: 5 }));
        assert!(query::slot_view(&world)
            .iter()
            .all(|slot| !slot.is_visible()));
        assert_eq!(query::pending_timers(&world), 1);
    }
}
