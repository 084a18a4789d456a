#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Whack-a-Penguin experience.

use whack_core::{Command, WorldPoint};
use whack_world::{query, World};

/// Number of slots and horizontal offset of every row, top row first.
const ROWS: [(u32, f32); 4] = [(5, 100.0), (4, 180.0), (5, 100.0), (4, 180.0)];
/// Vertical position of the top row.
const FIRST_ROW_Y: f32 = 358.0;
/// Vertical distance between consecutive rows.
const ROW_SPACING: f32 = 90.0;
/// Horizontal distance between neighbouring slots of a row.
const SLOT_SPACING: f32 = 170.0;

/// Produces data required to greet the player and lay out the field.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Positions of the four staggered rows of holes, 18 in total.
    #[must_use]
    pub fn default_layout(&self) -> Vec<WorldPoint> {
        ROWS.iter()
            .enumerate()
            .flat_map(|(row, (count, offset))| {
                let y = FIRST_ROW_Y + row as f32 * ROW_SPACING;
                (0..*count)
                    .map(move |index| WorldPoint::new(offset + index as f32 * SLOT_SPACING, y))
            })
            .collect()
    }

    /// Commands that configure the default layout and start a game.
    #[must_use]
    pub fn setup_commands(&self) -> Vec<Command> {
        vec![
            Command::ConfigureSlots {
                positions: self.default_layout(),
            },
            Command::StartGame,
        ]
    }
}
