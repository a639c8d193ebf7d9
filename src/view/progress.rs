//! Scrubber rendering for the now-playing screen

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::PositionSync;
use super::utils::format_time;

/// Elapsed and remaining time, the way the scrubber labels them
pub fn scrubber_label(sync: &PositionSync) -> String {
    format!(
        "{}  {}%  -{}",
        format_time(sync.current_time()),
        sync.percent(),
        format_time(sync.remaining_time())
    )
}

pub fn render_scrubber(frame: &mut Frame, area: Rect, sync: &PositionSync, loading: bool) {
    let (title, color) = if sync.is_scrubbing() {
        (" Scrubbing ", Color::Yellow)
    } else {
        ("", Color::Green)
    };

    let (label, percent) = if loading {
        ("Loading...".to_string(), 0)
    } else {
        (scrubber_label(sync), sync.percent().min(100))
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(Line::from(" Enter: scrub ").right_aligned()),
        )
        .gauge_style(Style::default().fg(color))
        .percent(percent)
        .label(label);

    frame.render_widget(gauge, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlayerSnapshot;

    #[test]
    fn test_scrubber_label_shows_remaining_time() {
        let sync = PositionSync::attach(Some(&PlayerSnapshot {
            position_ms: 61_500,
            duration_ms: 245_000,
            is_playing: true,
            track_uri: None,
        }));
        assert_eq!(scrubber_label(&sync), "1:01  25%  -3:04");
    }

    #[test]
    fn test_scrubber_label_without_player() {
        let sync = PositionSync::attach(None);
        assert_eq!(scrubber_label(&sync), "0:00  0%  -0:00");
    }
}
