//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Ui},
};

/// Buttons pressed during the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ReceiverButtons {
    /// Whether the power switch was pressed.
    pub power: bool,
    /// Whether the re-establish button was pressed.
    pub restart: bool,
}

/// Placement and state used to draw the receiver buttons.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ReceiverUiContext {
    /// Top-left corner of the button strip in screen coordinates.
    pub origin: Vec2,
    /// Whether the receiver is powered; selects the power button label.
    pub powered: bool,
    /// Whether the signal was lost; the re-establish button only shows then.
    pub signal_lost: bool,
}

/// Renders the power switch and, after a lost signal, the re-establish button.
pub(crate) fn draw_receiver_buttons(ui: &mut Ui, context: ReceiverUiContext) -> ReceiverButtons {
    let background = Color::from_rgba(17, 17, 17, 255);
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    let window_style = ui
        .style_builder()
        .color(background)
        .color_hovered(background)
        .color_clicked(background)
        .color_selected(background)
        .color_selected_hovered(background)
        .color_inactive(background)
        .margin(RectOffset::new(4.0, 4.0, 4.0, 4.0))
        .build();
    skin.window_style = window_style;

    let (idle, hovered) = if context.powered {
        (
            Color::from_rgba(153, 27, 27, 255),
            Color::from_rgba(185, 28, 28, 255),
        )
    } else {
        (
            Color::from_rgba(38, 38, 38, 255),
            Color::from_rgba(64, 64, 64, 255),
        )
    };
    let button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(idle)
        .color_hovered(hovered)
        .color_clicked(idle)
        .color_selected(idle)
        .color_selected_hovered(hovered)
        .color_inactive(idle)
        .margin(RectOffset::new(12.0, 12.0, 8.0, 8.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let mut pressed = ReceiverButtons::default();
    let size = Vec2::new(212.0, 48.0);
    let _ = ui.window(hash!("receiver_buttons"), context.origin, size, |ui| {
        let power_label = if context.powered {
            "POWER OFF"
        } else {
            "POWER ON"
        };
        pressed.power = ui.button(None, power_label);
        if context.signal_lost {
            ui.same_line(0.0);
            pressed.restart = ui.button(None, "RE-ESTABLISH");
        }
    });

    ui.pop_skin();
    pressed
}
