//! Frame-driven simulation wiring the world to its systems.

use std::time::{Duration, Instant};

use whack_core::{Command, Cue, Event, GamePhase, SlotView, Tuning, Variant, WorldPoint};
use whack_rendering::{
    ActorAnimator, FrameInput, FrameSimulationBreakdown, Scene, SlotPresentation,
};
use whack_system_bootstrap::Bootstrap;
use whack_system_spawning::{Config as SpawningConfig, Spawning};
use whack_system_tapping::Tapping;
use whack_world::{self as world, query, World};

/// Fixed frame length used when no window drives the simulation.
pub(crate) const HEADLESS_FRAME: Duration = Duration::from_nanos(16_666_667);

/// Owns the world and every system, and advances them frame by frame.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    bootstrap: Bootstrap,
    spawning: Spawning,
    tapping: Tapping,
    animator: ActorAnimator,
    pending_events: Vec<Event>,
    pending_cues: Vec<Cue>,
}

impl Simulation {
    /// Creates a simulation and starts the first game.
    pub(crate) fn new(tuning: Tuning, seed: u64) -> Self {
        let mut simulation = Self {
            world: World::with_tuning(tuning.clone()),
            bootstrap: Bootstrap,
            spawning: Spawning::new(SpawningConfig::new(tuning.clone(), seed)),
            tapping: Tapping::new(),
            animator: ActorAnimator::new(&tuning),
            pending_events: Vec::new(),
            pending_cues: Vec::new(),
        };

        for command in simulation.bootstrap.setup_commands() {
            world::apply(&mut simulation.world, command, &mut simulation.pending_events);
        }
        simulation.pump(None);
        simulation
    }

    /// Banner greeting the player.
    pub(crate) fn welcome_banner(&self) -> &str {
        self.bootstrap.welcome_banner(&self.world)
    }

    /// Advances the simulation by one frame.
    pub(crate) fn advance(&mut self, dt: Duration, input: FrameInput) {
        if input.restart {
            log::info!("restart requested");
            world::apply(&mut self.world, Command::StartGame, &mut self.pending_events);
        }

        world::apply(&mut self.world, Command::Tick { dt }, &mut self.pending_events);
        for slot in self.animator.advance(dt) {
            log::trace!("animation of slot {} completed", slot.get());
        }

        let tap = input.tap.map(|tap| WorldPoint::new(tap.x, tap.y));
        self.pump(tap);
    }

    /// Routes pending events to the systems until no further commands arise.
    fn pump(&mut self, mut tap: Option<WorldPoint>) {
        while !self.pending_events.is_empty() {
            let events = std::mem::take(&mut self.pending_events);
            self.animator.handle(&events);
            self.pending_cues
                .extend(events.iter().filter_map(|event| match event {
                    Event::CueRequested { cue } => Some(*cue),
                    _ => None,
                }));

            let mut commands = Vec::new();
            self.spawning.handle(
                &events,
                query::round_snapshot(&self.world),
                query::wave_order(&self.world),
                &mut commands,
            );
            self.tapping.handle(
                &events,
                tap.take(),
                &query::slot_view(&self.world),
                &mut commands,
            );

            for command in commands {
                world::apply(&mut self.world, command, &mut self.pending_events);
            }
        }
    }

    /// Rewrites the scene from the current world state.
    pub(crate) fn populate_scene(&mut self, scene: &mut Scene) {
        scene.slots.clear();
        scene.slots.extend(query::slot_view(&self.world).iter().map(|slot| {
            SlotPresentation {
                id: slot.id,
                position: glam::Vec2::new(slot.position.x(), slot.position.y()),
                variant: slot.variant,
                state: slot.state,
                rise: self.animator.rise(slot.id),
                scale: self.animator.scale(slot.id),
            }
        }));
        scene.score = query::score(&self.world);
        scene.round = query::round(&self.world);
        scene.game_over = query::phase(&self.world) == GamePhase::Over;
        scene.cues.append(&mut self.pending_cues);
    }

    /// Runs one windowed frame and reports how long each stage took.
    pub(crate) fn frame(
        &mut self,
        dt: Duration,
        input: FrameInput,
        scene: &mut Scene,
    ) -> FrameSimulationBreakdown {
        let simulation_start = Instant::now();
        self.advance(dt, input);
        let simulation = simulation_start.elapsed();

        let population_start = Instant::now();
        self.populate_scene(scene);
        FrameSimulationBreakdown {
            simulation,
            scene_population: population_start.elapsed(),
        }
    }

    pub(crate) fn slot_view(&self) -> SlotView {
        query::slot_view(&self.world)
    }

    pub(crate) fn score(&self) -> i64 {
        query::score(&self.world)
    }

    pub(crate) fn round(&self) -> u32 {
        query::round(&self.world)
    }

    pub(crate) fn phase(&self) -> GamePhase {
        query::phase(&self.world)
    }
}

/// Outcome of a headless autoplay session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct HeadlessReport {
    pub(crate) score: i64,
    pub(crate) rounds: u32,
    pub(crate) frames: u32,
    pub(crate) phase: GamePhase,
}

/// Picks the tap a scripted player makes: the first raised enemy.
pub(crate) fn autoplay_tap(view: &SlotView) -> Option<glam::Vec2> {
    view.iter()
        .find(|slot| slot.is_whackable() && slot.variant == Variant::Enemy)
        .map(|slot| glam::Vec2::new(slot.position.x(), slot.position.y()))
}

/// Plays without a window until the game ends or `max_frames` elapse.
pub(crate) fn run_headless(simulation: &mut Simulation, max_frames: u32) -> HeadlessReport {
    let mut frames = 0;
    while frames < max_frames && simulation.phase() != GamePhase::Over {
        let input = FrameInput {
            tap: autoplay_tap(&simulation.slot_view()),
            restart: false,
        };
        simulation.advance(HEADLESS_FRAME, input);
        frames += 1;
    }

    let report = HeadlessReport {
        score: simulation.score(),
        rounds: simulation.round(),
        frames,
        phase: simulation.phase(),
    };
    log::info!(
        "headless session finished after {} frames: score {}, {} rounds, {:?}",
        report.frames,
        report.score,
        report.rounds,
        report.phase
    );
    report
}
