//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Ui},
};

/// Outcome of rendering the game-over panel during the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct GameOverUiResult {
    /// Whether the new game button was pressed during this frame.
    pub restart_pressed: bool,
}

/// Snapshot of the game-over panel layout and data for the current frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GameOverUiContext {
    /// Top-left corner of the panel in screen coordinates.
    pub origin: Vec2,
    /// Panel dimensions in screen space.
    pub size: Vec2,
    /// Background colour applied to the window skin.
    pub background: Color,
    /// Final score of the finished game.
    pub score: i64,
    /// Waves played before the game ended.
    pub rounds: u32,
}

/// Renders the game-over panel with its new game button.
pub(crate) fn draw_game_over_ui(ui: &mut Ui, context: GameOverUiContext) -> GameOverUiResult {
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    let window_style = ui
        .style_builder()
        .color(context.background)
        .color_hovered(context.background)
        .color_clicked(context.background)
        .color_selected(context.background)
        .color_selected_hovered(context.background)
        .color_inactive(context.background)
        .text_color(WHITE)
        .margin(RectOffset::new(16.0, 16.0, 16.0, 16.0))
        .build();
    skin.window_style = window_style;

    let label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(0.0, 0.0, 4.0, 4.0))
        .build();
    skin.label_style = label_style;

    let button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(Color::from_rgba(70, 70, 70, 255))
        .color_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_clicked(Color::from_rgba(56, 56, 56, 255))
        .margin(RectOffset::new(0.0, 0.0, 8.0, 8.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let mut restart_pressed = false;
    let _ = ui.window(hash!("game_over"), context.origin, context.size, |ui| {
        ui.label(None, "GAME OVER");
        ui.label(None, &format!("Final score: {}", context.score));
        ui.label(None, &format!("Waves: {}", context.rounds));
        ui.label(None, "Press R or use the button below.");
        restart_pressed = ui.button(None, "New game");
    });

    ui.pop_skin();

    GameOverUiResult { restart_pressed }
}
