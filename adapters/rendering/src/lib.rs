#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Whack-a-Penguin adapters.

pub mod animation;

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};
use whack_core::{Cue, SlotId, SlotState, Variant, TARGET_CENTER_OFFSET, TARGET_HALF_HEIGHT};

pub use animation::{ActorAction, ActorAnimator, RISE_DISTANCE};

/// Distance below the hole centre where the actor is cropped away.
pub const CROP_OFFSET: f32 = 20.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Tap observed on this frame, expressed in world units.
    pub tap: Option<Vec2>,
    /// Whether the player asked for a new game on this frame.
    pub restart: bool,
}

/// Time spent by the simulation while producing a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSimulationBreakdown {
    /// Time spent applying commands and running systems.
    pub simulation: Duration,
    /// Time spent rebuilding the scene from world queries.
    pub scene_population: Duration,
}

/// Describes the play field the slots are laid out on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldPresentation {
    /// Width of the field in world units.
    pub width: f32,
    /// Height of the field in world units.
    pub height: f32,
    /// Color of the grass behind the holes.
    pub grass_color: Color,
    /// Color of an empty hole.
    pub hole_color: Color,
}

impl FieldPresentation {
    /// Width of the classic field.
    pub const DEFAULT_WIDTH: f32 = 1024.0;
    /// Height of the classic field.
    pub const DEFAULT_HEIGHT: f32 = 768.0;
    /// Grass of the classic field.
    pub const GRASS_COLOR: Color = Color::from_rgb_u8(96, 160, 72);
    /// Empty holes of the classic field.
    pub const HOLE_COLOR: Color = Color::from_rgb_u8(48, 32, 24);

    /// Creates a new field descriptor, rejecting degenerate dimensions.
    pub fn new(
        width: f32,
        height: f32,
        grass_color: Color,
        hole_color: Color,
    ) -> std::result::Result<Self, RenderingError> {
        let valid = |value: f32| value.is_finite() && value > 0.0;
        if !valid(width) || !valid(height) {
            return Err(RenderingError::InvalidFieldSize { width, height });
        }

        Ok(Self {
            width,
            height,
            grass_color,
            hole_color,
        })
    }

    /// Reports whether the world position lies on the field, edges included.
    #[must_use]
    pub fn contains(&self, position: Vec2) -> bool {
        position.x >= 0.0
            && position.y >= 0.0
            && position.x <= self.width
            && position.y <= self.height
    }
}

impl Default for FieldPresentation {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            grass_color: Self::GRASS_COLOR,
            hole_color: Self::HOLE_COLOR,
        }
    }
}

/// Presentation of a single hole and the actor living in it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotPresentation {
    /// Identifier of the slot.
    pub id: SlotId,
    /// Centre of the hole in world units.
    pub position: Vec2,
    /// Variant of the actor.
    pub variant: Variant,
    /// Lifecycle state reported by the world.
    pub state: SlotState,
    /// How far the actor has risen out of the hole, from 0 to [`RISE_DISTANCE`].
    pub rise: f32,
    /// Scale applied to the actor sprite.
    pub scale: f32,
}

impl SlotPresentation {
    /// Centre of the actor given its current rise.
    #[must_use]
    pub fn actor_center(&self) -> Vec2 {
        let sunk = RISE_DISTANCE - self.rise.clamp(0.0, RISE_DISTANCE);
        Vec2::new(
            self.position.x,
            self.position.y + TARGET_CENTER_OFFSET + sunk,
        )
    }

    /// Lowest visible edge of the actor; anything below is hidden by the hole.
    #[must_use]
    pub fn crop_line(&self) -> f32 {
        self.position.y + CROP_OFFSET
    }

    /// Reports whether any part of the actor pokes out of the hole.
    #[must_use]
    pub fn actor_visible(&self) -> bool {
        let top = self.actor_center().y - TARGET_HALF_HEIGHT * self.scale;
        top < self.crop_line() && self.rise > f32::EPSILON
    }
}

/// Declarative scene description consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Play field description.
    pub field: FieldPresentation,
    /// Slots in identifier order.
    pub slots: Vec<SlotPresentation>,
    /// Current score.
    pub score: i64,
    /// Waves spawned so far.
    pub round: u32,
    /// Whether the game-over marker is shown.
    pub game_over: bool,
    /// Sound cues requested since the backend last drained them.
    pub cues: Vec<Cue>,
}

impl Scene {
    /// Creates an empty scene on the provided field.
    #[must_use]
    pub fn new(field: FieldPresentation) -> Self {
        Self {
            field,
            slots: Vec::new(),
            score: 0,
            round: 0,
            game_over: false,
            cues: Vec::new(),
        }
    }

    /// Text of the score label.
    #[must_use]
    pub fn score_label(&self) -> String {
        format!("Score: {}", self.score)
    }
}

/// Static configuration for a rendering session.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown by the window.
    pub window_title: String,
    /// Color used to clear the frame.
    pub clear_color: Color,
    /// Scene rendered on the first frame.
    pub scene: Scene,
}

impl Presentation {
    /// Creates a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Abstraction implemented by concrete rendering backends.
pub trait RenderingBackend {
    /// Runs the backend until the player quits.
    ///
    /// `update_scene` is invoked once per frame with the elapsed time and the
    /// gathered input, and mutates the scene before it is drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameSimulationBreakdown + 'static;
}

/// Errors raised while building rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The field dimensions were not positive finite numbers.
    InvalidFieldSize {
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFieldSize { width, height } => {
                write!(
                    f,
                    "field dimensions must be positive (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
