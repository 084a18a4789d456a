#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system that draws the random decisions of every spawn wave.
//!
//! The world announces [`Event::WaveDue`] whenever its spawn timer elapses.
//! This system answers with a [`Command::SpawnWave`] whose [`WavePlan`]
//! carries the shuffled slot order, the reveals and the delay until the next
//! wave. All draws come from the injected random source.

use std::time::Duration;

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use whack_core::{
    Command, Event, GamePhase, Reveal, RoundSnapshot, SlotId, Tuning, Variant, WavePlan,
};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Debug)]
pub struct Config {
    tuning: Tuning,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided tuning and seed.
    #[must_use]
    pub const fn new(tuning: Tuning, rng_seed: u64) -> Self {
        Self { tuning, rng_seed }
    }
}

/// Pure system that turns due waves into spawn commands.
#[derive(Debug)]
pub struct Spawning<R = ChaCha8Rng> {
    tuning: Tuning,
    rng: R,
}

impl Spawning<ChaCha8Rng> {
    /// Creates a new spawning system seeded from the configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_rng(config.tuning, ChaCha8Rng::seed_from_u64(config.rng_seed))
    }
}

impl<R: Rng> Spawning<R> {
    /// Creates a spawning system drawing from the provided random source.
    #[must_use]
    pub fn with_rng(tuning: Tuning, rng: R) -> Self {
        Self { tuning, rng }
    }

    /// Consumes events and the round snapshot to emit spawn commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        round: RoundSnapshot,
        slots: &[SlotId],
        out: &mut Vec<Command>,
    ) {
        if round.phase == GamePhase::Over {
            return;
        }

        for event in events {
            let Event::WaveDue { round: due_round } = event else {
                continue;
            };

            let plan = if due_round.saturating_add(1) >= self.tuning.round_limit {
                WavePlan::default()
            } else {
                self.plan_wave(round.spawn_interval, slots)
            };
            out.push(Command::SpawnWave { plan });
        }
    }

    /// Draws a wave for the provided pre-decay spawn interval.
    pub fn plan_wave(&mut self, spawn_interval: Duration, slots: &[SlotId]) -> WavePlan {
        let interval = self.tuning.decayed(spawn_interval);

        let mut order = slots.to_vec();
        order.shuffle(&mut self.rng);

        let mut reveals = Vec::new();
        if let Some(first) = order.first() {
            let variant = draw_variant(&mut self.rng, self.tuning.friendly_chance);
            reveals.push(Reveal::new(*first, variant));
        }

        for (index, threshold) in self.tuning.reveal_thresholds.iter().enumerate() {
            let Some(slot) = order.get(index + 1) else {
                break;
            };
            let draw = self.rng.gen_range(0..=self.tuning.reveal_draw_max);
            if draw > *threshold {
                let variant = draw_variant(&mut self.rng, self.tuning.friendly_chance);
                reveals.push(Reveal::new(*slot, variant));
            }
        }

        let next_wave_in = self.draw_next_delay(interval);
        log::trace!(
            "planned {} reveal(s), next wave in {:.3}s",
            reveals.len(),
            next_wave_in.as_secs_f64()
        );

        WavePlan {
            order,
            reveals,
            next_wave_in,
        }
    }

    fn draw_next_delay(&mut self, interval: Duration) -> Duration {
        let (min, max) = self.tuning.next_wave_bounds(interval);
        let seconds = self.rng.gen_range(min.as_secs_f64()..=max.as_secs_f64());
        Duration::try_from_secs_f64(seconds).unwrap_or(min)
    }
}

fn draw_variant<R: Rng>(rng: &mut R, friendly_chance: f64) -> Variant {
    let chance = if friendly_chance.is_nan() {
        0.5
    } else {
        friendly_chance.clamp(0.0, 1.0)
    };
    if rng.gen_bool(chance) {
        Variant::Friendly
    } else {
        Variant::Enemy
    }
}
