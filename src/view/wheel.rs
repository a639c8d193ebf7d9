//! The click wheel: drawing and pointer hit testing

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Line,
    widgets::canvas::{Canvas, Circle, Points},
    widgets::Block,
    Frame,
};

use crate::model::{RotaryDecoder, DEFAULT_DIAL_STEP};

/// Hub radius as a fraction of the wheel radius
const HUB_RADIUS: f64 = 0.4;
const DIAL_MARKER_RADIUS: f64 = 0.7;

/// Where a pointer landed on the wheel
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WheelHit {
    Center,
    /// On the ring, at an angle in degrees clockwise from 12 o'clock
    Ring { angle: f64 },
}

/// Maps terminal cells onto the wheel drawn in `area`. The wheel fills the
/// area, so it is an ellipse in cell units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WheelGeometry {
    area: Rect,
}

impl WheelGeometry {
    pub fn new(area: Rect) -> Self {
        Self { area }
    }

    pub fn hit(&self, column: u16, row: u16) -> Option<WheelHit> {
        if self.area.width == 0 || self.area.height == 0 {
            return None;
        }
        let half_width = self.area.width as f64 / 2.0;
        let half_height = self.area.height as f64 / 2.0;
        let dx = (column as f64 + 0.5 - (self.area.x as f64 + half_width)) / half_width;
        let dy = (row as f64 + 0.5 - (self.area.y as f64 + half_height)) / half_height;

        let radius = (dx * dx + dy * dy).sqrt();
        if radius > 1.0 {
            None
        } else if radius < HUB_RADIUS {
            Some(WheelHit::Center)
        } else {
            let angle = dx.atan2(-dy).to_degrees().rem_euclid(360.0);
            Some(WheelHit::Ring { angle })
        }
    }
}

/// Unit-circle point for a dial value, with 0 at 12 o'clock
fn dial_point(value: u8, radius: f64) -> (f64, f64) {
    let angle = (value as f64 / 100.0) * std::f64::consts::TAU;
    (radius * angle.sin(), radius * angle.cos())
}

pub fn render_wheel(frame: &mut Frame, area: Rect, wheel: &RotaryDecoder, playing: bool) {
    let (marker_x, marker_y) = dial_point(wheel.value(), DIAL_MARKER_RADIUS);
    let play_label = if playing { "⏸" } else { "▶" };
    let fine = wheel.step() < DEFAULT_DIAL_STEP;

    let canvas = Canvas::default()
        .block(Block::default())
        .marker(Marker::Braille)
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(move |ctx| {
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: 0.98,
                color: Color::Gray,
            });
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: HUB_RADIUS,
                color: Color::Gray,
            });
            ctx.draw(&Points {
                coords: &[(marker_x, marker_y)],
                color: if fine { Color::Cyan } else { Color::White },
            });
            ctx.print(-0.12, 0.72, Line::styled("MENU", Style::default().fg(Color::White)));
            ctx.print(-0.82, 0.0, Line::from("⏮"));
            ctx.print(0.78, 0.0, Line::from("⏭"));
            ctx.print(-0.04, -0.8, Line::from(play_label));
        });

    frame.render_widget(canvas, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> WheelGeometry {
        WheelGeometry::new(Rect::new(0, 0, 40, 20))
    }

    fn ring_angle(hit: Option<WheelHit>) -> f64 {
        match hit {
            Some(WheelHit::Ring { angle }) => angle,
            other => panic!("expected ring hit, got {:?}", other),
        }
    }

    #[test]
    fn test_hub_and_outside() {
        assert_eq!(geometry().hit(20, 10), Some(WheelHit::Center));
        assert_eq!(geometry().hit(0, 0), None);
    }

    #[test]
    fn test_ring_angles_map_to_quadrants() {
        use crate::model::Quadrant;

        let quadrant = |column, row| Quadrant::from_angle(ring_angle(geometry().hit(column, row)));
        assert_eq!(quadrant(20, 1), Some(Quadrant::Top));
        assert_eq!(quadrant(38, 10), Some(Quadrant::Right));
        assert_eq!(quadrant(20, 19), Some(Quadrant::Bottom));
        assert_eq!(quadrant(1, 10), Some(Quadrant::Left));
    }

    #[test]
    fn test_offset_area() {
        let geometry = WheelGeometry::new(Rect::new(10, 5, 40, 20));
        assert_eq!(geometry.hit(30, 15), Some(WheelHit::Center));
        assert_eq!(geometry.hit(9, 15), None);
    }

    #[test]
    fn test_dial_point_starts_at_top() {
        let (x, y) = dial_point(0, 1.0);
        assert!(x.abs() < 1e-9 && (y - 1.0).abs() < 1e-9);
        let (x, y) = dial_point(25, 1.0);
        assert!((x - 1.0).abs() < 1e-9 && y.abs() < 1e-9);
    }
}
