#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Whack-a-Penguin engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::{error::Error, fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Whack-a-Penguin.";

/// Half of the horizontal extent of a raised target, in world units.
pub const TARGET_HALF_WIDTH: f32 = 40.0;
/// Half of the vertical extent of a raised target, in world units.
pub const TARGET_HALF_HEIGHT: f32 = 50.0;
/// Vertical offset from the slot position to the centre of a raised target.
pub const TARGET_CENTER_OFFSET: f32 = -5.0;

/// Describes the lifecycle phase of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GamePhase {
    /// Slots may be configured but no wave has been scheduled.
    Idle,
    /// Waves are being spawned and taps are scored.
    Running,
    /// The round limit was reached. Terminal.
    Over,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the slot layout with holes at the provided positions.
    ConfigureSlots {
        /// Position of every slot, in identifier order.
        positions: Vec<WorldPoint>,
    },
    /// Resets the round state and schedules the first spawn wave.
    StartGame,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Runs a spawn wave using the random decisions captured in the plan.
    SpawnWave {
        /// Random decisions drawn by the spawning system.
        plan: WavePlan,
    },
    /// Requests that the provided slot be struck by the player.
    Whack {
        /// Identifier of the slot the player tapped.
        slot: SlotId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the slot layout was replaced.
    SlotsConfigured {
        /// Number of slots in the new layout.
        count: usize,
    },
    /// Announces that a new game started and the first wave is pending.
    GameStarted,
    /// Announces that the spawn timer elapsed and a wave plan is required.
    WaveDue {
        /// Round counter value before the wave is spawned.
        round: u32,
    },
    /// Confirms that a spawn wave revealed its slots.
    WaveSpawned {
        /// Round counter value after the wave.
        round: u32,
        /// Spawn interval in effect for the wave.
        spawn_interval: Duration,
        /// Number of slots that transitioned to visible.
        revealed: usize,
    },
    /// Confirms that a slot raised its target.
    SlotShown {
        /// Identifier of the slot.
        slot: SlotId,
        /// Variant of the raised target.
        variant: Variant,
        /// Time until the slot hides itself unless struck.
        visible_for: Duration,
    },
    /// Confirms that a slot lowered its target without being struck.
    SlotHidden {
        /// Identifier of the slot.
        slot: SlotId,
    },
    /// Confirms that the player struck a raised target.
    SlotHit {
        /// Identifier of the slot.
        slot: SlotId,
        /// Variant of the struck target.
        variant: Variant,
    },
    /// Announces that a struck target started its shrinking retreat.
    SlotRetreating {
        /// Identifier of the slot.
        slot: SlotId,
        /// Length of the retreat animation.
        duration: Duration,
    },
    /// Confirms that a struck target finished retreating and is hidden.
    SlotSettled {
        /// Identifier of the slot.
        slot: SlotId,
    },
    /// Reports the new score after every mutation.
    ScoreChanged {
        /// Score after the mutation.
        score: i64,
        /// Signed change applied by the mutation.
        delta: i64,
    },
    /// Requests that adapters play an audio cue.
    CueRequested {
        /// Cue to play.
        cue: Cue,
    },
    /// Announces that the round limit was reached.
    GameOver {
        /// Final score.
        score: i64,
        /// Number of waves counted, including the terminal one.
        rounds: u32,
    },
}

/// Random decisions that shape a single spawn wave.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct WavePlan {
    /// Permutation of every slot identifier applied before the wave.
    pub order: Vec<SlotId>,
    /// Slots to reveal, in reveal order.
    pub reveals: Vec<Reveal>,
    /// Delay after which the next wave becomes due.
    pub next_wave_in: Duration,
}

/// Single slot reveal captured in a [`WavePlan`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Reveal {
    /// Slot that should raise its target.
    pub slot: SlotId,
    /// Variant drawn for the target.
    pub variant: Variant,
}

impl Reveal {
    /// Creates a new reveal descriptor.
    #[must_use]
    pub const fn new(slot: SlotId, variant: Variant) -> Self {
        Self { slot, variant }
    }
}

/// Target variants a slot can raise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Must not be struck; costs points when hit.
    Friendly,
    /// Should be struck; awards points when hit.
    Enemy,
}

/// Audio cues requested by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    /// An enemy was struck.
    Whack,
    /// A friendly target was struck.
    WhackBad,
}

impl Cue {
    /// Stable name used by adapters to look up the cue.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Whack => "whack",
            Self::WhackBad => "whack_bad",
        }
    }
}

/// Lifecycle state of a single slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// Target is lowered and cannot be struck.
    Hidden,
    /// Target is raised and can be struck.
    Visible,
    /// Target was struck during the current reveal and is retreating.
    Hit,
}

/// Unique identifier assigned to a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(u32);

impl SlotId {
    /// Creates a new slot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location in the play field measured in world units; y grows downwards.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Area that accepts taps while a target is raised in a slot at this point.
    #[must_use]
    pub fn target_bounds(self) -> TargetBounds {
        let center_y = self.y + TARGET_CENTER_OFFSET;
        TargetBounds {
            min_x: self.x - TARGET_HALF_WIDTH,
            max_x: self.x + TARGET_HALF_WIDTH,
            min_y: center_y - TARGET_HALF_HEIGHT,
            max_y: center_y + TARGET_HALF_HEIGHT,
        }
    }
}

/// Axis-aligned rectangle describing a raised target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetBounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl TargetBounds {
    /// Reports whether the point lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, point: WorldPoint) -> bool {
        point.x() >= self.min_x
            && point.x() <= self.max_x
            && point.y() >= self.min_y
            && point.y() <= self.max_y
    }
}

/// Immutable representation of a single slot used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotSnapshot {
    /// Identifier of the slot.
    pub id: SlotId,
    /// Fixed position of the hole.
    pub position: WorldPoint,
    /// Variant drawn at the latest reveal.
    pub variant: Variant,
    /// Current lifecycle state.
    pub state: SlotState,
    /// Scale applied to the target actor.
    pub actor_scale: f32,
}

impl SlotSnapshot {
    /// Reports whether the target is raised, struck or not.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        !matches!(self.state, SlotState::Hidden)
    }

    /// Reports whether the target was struck during the current reveal.
    #[must_use]
    pub const fn is_hit(&self) -> bool {
        matches!(self.state, SlotState::Hit)
    }

    /// Reports whether a tap on this slot would be scored.
    #[must_use]
    pub const fn is_whackable(&self) -> bool {
        matches!(self.state, SlotState::Visible)
    }
}

/// Read-only snapshot describing every slot.
#[derive(Clone, Debug, Default)]
pub struct SlotView {
    snapshots: Vec<SlotSnapshot>,
}

impl SlotView {
    /// Creates a new slot view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<SlotSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &SlotSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single slot.
    #[must_use]
    pub fn get(&self, slot: SlotId) -> Option<&SlotSnapshot> {
        self.snapshots
            .binary_search_by_key(&slot, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Identifiers of every captured slot.
    #[must_use]
    pub fn ids(&self) -> Vec<SlotId> {
        self.snapshots.iter().map(|snapshot| snapshot.id).collect()
    }

    /// Number of captured slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Round state consumed by the spawning system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundSnapshot {
    /// Waves counted so far.
    pub round: u32,
    /// Spawn interval before the next decay.
    pub spawn_interval: Duration,
    /// Current game phase.
    pub phase: GamePhase,
}

/// Tunable game-feel constants.
///
/// The defaults reproduce the empirically tuned values of the classic game;
/// they carry no derivation and should be changed only as a whole.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    /// Spawn interval before the first decay, in seconds.
    pub initial_spawn_interval_secs: f64,
    /// Factor applied to the spawn interval at every wave.
    pub spawn_interval_decay: f64,
    /// Multiplier turning a wave's spawn interval into a target's visible time.
    pub visible_duration_factor: f64,
    /// Delay between the start of a game and its first wave, in seconds.
    pub first_wave_delay_secs: f64,
    /// Wave count at which the game ends.
    pub round_limit: u32,
    /// Inclusive upper bound of the reveal draw.
    pub reveal_draw_max: u32,
    /// Draw thresholds for the optional reveals; the first slot always shows.
    pub reveal_thresholds: Vec<u32>,
    /// Probability that a revealed target is friendly.
    pub friendly_chance: f64,
    /// Pause between a strike and the retreat animation, in seconds.
    pub hit_retreat_delay_secs: f64,
    /// Length of the retreat animation, in seconds.
    pub hit_retreat_duration_secs: f64,
    /// Points awarded for striking an enemy.
    pub enemy_reward: i64,
    /// Points deducted for striking a friendly target.
    pub friendly_penalty: i64,
    /// Actor scale applied when an enemy is struck.
    pub enemy_hit_scale: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_spawn_interval_secs: 0.85,
            spawn_interval_decay: 0.991,
            visible_duration_factor: 3.5,
            first_wave_delay_secs: 1.0,
            round_limit: 30,
            reveal_draw_max: 12,
            reveal_thresholds: vec![4, 8, 10, 11],
            friendly_chance: 0.5,
            hit_retreat_delay_secs: 0.25,
            hit_retreat_duration_secs: 0.5,
            enemy_reward: 1,
            friendly_penalty: 5,
            enemy_hit_scale: 0.85,
        }
    }
}

impl Tuning {
    /// Spawn interval before the first wave.
    #[must_use]
    pub fn initial_spawn_interval(&self) -> Duration {
        seconds(self.initial_spawn_interval_secs)
    }

    /// Delay between the start of a game and its first wave.
    #[must_use]
    pub fn first_wave_delay(&self) -> Duration {
        seconds(self.first_wave_delay_secs)
    }

    /// Pause between a strike and the retreat animation.
    #[must_use]
    pub fn hit_retreat_delay(&self) -> Duration {
        seconds(self.hit_retreat_delay_secs)
    }

    /// Length of the retreat animation.
    #[must_use]
    pub fn hit_retreat_duration(&self) -> Duration {
        seconds(self.hit_retreat_duration_secs)
    }

    /// Applies a single wave of decay to the provided spawn interval.
    #[must_use]
    pub fn decayed(&self, spawn_interval: Duration) -> Duration {
        scale(spawn_interval, self.spawn_interval_decay)
    }

    /// Time a target revealed with `hide_after` stays raised.
    #[must_use]
    pub fn visible_duration(&self, hide_after: Duration) -> Duration {
        scale(hide_after, self.visible_duration_factor)
    }

    /// Inclusive range from which the delay until the next wave is drawn.
    #[must_use]
    pub fn next_wave_bounds(&self, spawn_interval: Duration) -> (Duration, Duration) {
        (spawn_interval / 2, spawn_interval.saturating_mul(2))
    }

    /// Validates that every value describes a playable game.
    pub fn validate(&self) -> Result<(), TuningError> {
        let durations = [
            ("initial_spawn_interval_secs", self.initial_spawn_interval_secs),
            ("first_wave_delay_secs", self.first_wave_delay_secs),
            ("hit_retreat_delay_secs", self.hit_retreat_delay_secs),
            ("hit_retreat_duration_secs", self.hit_retreat_duration_secs),
            ("visible_duration_factor", self.visible_duration_factor),
        ];
        for (field, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(TuningError::NegativeDuration { field });
            }
            if Duration::try_from_secs_f64(value).is_err() {
                return Err(TuningError::DurationOutOfRange { field });
            }
        }

        let longest_visible = self.initial_spawn_interval_secs * self.visible_duration_factor;
        if Duration::try_from_secs_f64(longest_visible).is_err() {
            return Err(TuningError::DurationOutOfRange {
                field: "visible_duration_factor",
            });
        }

        if self.initial_spawn_interval_secs <= 0.0 {
            return Err(TuningError::NegativeDuration {
                field: "initial_spawn_interval_secs",
            });
        }

        if !(self.spawn_interval_decay > 0.0 && self.spawn_interval_decay <= 1.0) {
            return Err(TuningError::DecayOutOfRange {
                decay: self.spawn_interval_decay,
            });
        }

        if !(0.0..=1.0).contains(&self.friendly_chance) {
            return Err(TuningError::ChanceOutOfRange {
                chance: self.friendly_chance,
            });
        }

        if self.round_limit == 0 {
            return Err(TuningError::ZeroRoundLimit);
        }

        let ascending = self
            .reveal_thresholds
            .windows(2)
            .all(|pair| pair[0] <= pair[1]);
        let in_range = self
            .reveal_thresholds
            .iter()
            .all(|threshold| *threshold <= self.reveal_draw_max);
        if !ascending || !in_range {
            return Err(TuningError::InvalidThresholds {
                draw_max: self.reveal_draw_max,
            });
        }

        if !self.enemy_hit_scale.is_finite() || self.enemy_hit_scale <= 0.0 {
            return Err(TuningError::InvalidHitScale {
                scale: self.enemy_hit_scale,
            });
        }

        Ok(())
    }
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

fn scale(duration: Duration, factor: f64) -> Duration {
    seconds(duration.as_secs_f64() * factor)
}

/// Reasons a [`Tuning`] may be rejected.
#[derive(Clone, Debug, PartialEq)]
pub enum TuningError {
    /// A duration field is negative, zero where it must not be, or not finite.
    NegativeDuration {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A duration field is too large to be represented.
    DurationOutOfRange {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The spawn interval decay lies outside `(0, 1]`.
    DecayOutOfRange {
        /// Rejected decay factor.
        decay: f64,
    },
    /// The friendly chance lies outside `[0, 1]`.
    ChanceOutOfRange {
        /// Rejected probability.
        chance: f64,
    },
    /// The game would end before its first wave.
    ZeroRoundLimit,
    /// Reveal thresholds are not ascending or exceed the draw range.
    InvalidThresholds {
        /// Inclusive upper bound of the reveal draw.
        draw_max: u32,
    },
    /// The enemy hit scale is not a positive finite number.
    InvalidHitScale {
        /// Rejected scale.
        scale: f32,
    },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeDuration { field } => {
                write!(f, "{field} must be a positive, finite number of seconds")
            }
            Self::DurationOutOfRange { field } => {
                write!(f, "{field} describes a duration too long to schedule")
            }
            Self::DecayOutOfRange { decay } => {
                write!(f, "spawn_interval_decay must lie in (0, 1] (received {decay})")
            }
            Self::ChanceOutOfRange { chance } => {
                write!(f, "friendly_chance must lie in [0, 1] (received {chance})")
            }
            Self::ZeroRoundLimit => write!(f, "round_limit must be positive"),
            Self::InvalidThresholds { draw_max } => write!(
                f,
                "reveal_thresholds must be ascending and no greater than {draw_max}"
            ),
            Self::InvalidHitScale { scale } => {
                write!(f, "enemy_hit_scale must be positive (received {scale})")
            }
        }
    }
}

impl Error for TuningError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn slot_id_round_trips_through_bincode() {
        assert_round_trip(&SlotId::new(17));
    }

    #[test]
    fn tuning_round_trips_through_bincode() {
        assert_round_trip(&Tuning::default());
    }

    #[test]
    fn target_bounds_surround_raised_actor() {
        let bounds = WorldPoint::new(100.0, 358.0).target_bounds();

        assert!(bounds.contains(WorldPoint::new(100.0, 353.0)));
        assert!(bounds.contains(WorldPoint::new(60.0, 303.0)));
        assert!(bounds.contains(WorldPoint::new(140.0, 403.0)));
        assert!(!bounds.contains(WorldPoint::new(141.0, 353.0)));
        assert!(!bounds.contains(WorldPoint::new(100.0, 404.0)));
    }

    #[test]
    fn default_tuning_is_valid() {
        assert_eq!(Tuning::default().validate(), Ok(()));
    }

    #[test]
    fn decay_compounds_per_wave() {
        let tuning = Tuning::default();
        let mut interval = tuning.initial_spawn_interval();
        for _ in 0..10 {
            interval = tuning.decayed(interval);
        }

        let expected = 0.85 * 0.991_f64.powi(10);
        assert!((interval.as_secs_f64() - expected).abs() < 1e-6);
    }

    #[test]
    fn visible_duration_scales_hide_after() {
        let tuning = Tuning::default();
        let visible = tuning.visible_duration(Duration::from_millis(800));

        assert!((visible.as_secs_f64() - 2.8).abs() < 1e-9);
    }

    #[test]
    fn validation_rejects_descending_thresholds() {
        let tuning = Tuning {
            reveal_thresholds: vec![8, 4],
            ..Tuning::default()
        };

        assert_eq!(
            tuning.validate(),
            Err(TuningError::InvalidThresholds { draw_max: 12 })
        );
    }

    #[test]
    fn validation_rejects_unrepresentable_durations() {
        let interval = Tuning {
            initial_spawn_interval_secs: 1e30,
            ..Tuning::default()
        };
        assert_eq!(
            interval.validate(),
            Err(TuningError::DurationOutOfRange {
                field: "initial_spawn_interval_secs"
            })
        );

        let visible = Tuning {
            initial_spawn_interval_secs: 1e10,
            visible_duration_factor: 1e12,
            ..Tuning::default()
        };
        assert_eq!(
            visible.validate(),
            Err(TuningError::DurationOutOfRange {
                field: "visible_duration_factor"
            })
        );
    }

    #[test]
    fn validation_rejects_decay_above_one() {
        let tuning = Tuning {
            spawn_interval_decay: 1.2,
            ..Tuning::default()
        };

        assert!(matches!(
            tuning.validate(),
            Err(TuningError::DecayOutOfRange { .. })
        ));
    }

    #[test]
    fn slot_view_lookup_uses_identifier_order() {
        let snapshot = |id: u32, state: SlotState| SlotSnapshot {
            id: SlotId::new(id),
            position: WorldPoint::new(id as f32, 0.0),
            variant: Variant::Enemy,
            state,
            actor_scale: 1.0,
        };
        let view = SlotView::from_snapshots(vec![
            snapshot(2, SlotState::Hit),
            snapshot(0, SlotState::Hidden),
            snapshot(1, SlotState::Visible),
        ]);

        assert_eq!(view.ids(), vec![SlotId::new(0), SlotId::new(1), SlotId::new(2)]);
        let hit = view.get(SlotId::new(2)).expect("slot 2 captured");
        assert!(hit.is_visible());
        assert!(hit.is_hit());
        assert!(!hit.is_whackable());
        assert!(view.get(SlotId::new(7)).is_none());
    }
}
