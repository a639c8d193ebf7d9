//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `screen`: The player's screen (menus, now playing, cover flow)
//! - `progress`: Scrubber rendering
//! - `wheel`: The click wheel and pointer hit testing
//! - `overlays`: Modal overlays (error)
//! - `title`: Terminal title for the current song

mod utils;
mod screen;
mod progress;
mod wheel;
mod overlays;
mod title;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::model::AppModel;

pub use title::TerminalTitle;
pub use wheel::{WheelGeometry, WheelHit};

/// Split the terminal into the screen (top) and the wheel (bottom). The
/// wheel is kept about twice as wide as tall so it draws round.
pub fn layout_areas(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45), // Screen
            Constraint::Percentage(55), // Wheel
        ])
        .split(area);

    let wheel_area = chunks[1];
    let width = wheel_area.width.min(wheel_area.height.saturating_mul(2));
    let wheel = Rect {
        x: wheel_area.x + (wheel_area.width - width) / 2,
        width,
        ..wheel_area
    };
    (chunks[0], wheel)
}

pub fn wheel_geometry(area: Rect) -> WheelGeometry {
    let (_, wheel) = layout_areas(area);
    WheelGeometry::new(wheel)
}

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, model: &AppModel) {
        let (screen_area, wheel_area) = layout_areas(frame.area());

        screen::render_screen(frame, screen_area, model);
        wheel::render_wheel(frame, wheel_area, model.wheel(), model.session().is_playing());

        // Error notification overlay (if there's an error)
        if let Some(error_msg) = model.error_message() {
            overlays::render_error_notification(frame, error_msg);
        }
    }
}
