//! Rotary input decoding
//!
//! Turns a bounded dial position (0..=100, wrapping) into directional scroll
//! events, classifies clicks on the ring into quadrants, and maps key presses
//! onto the same event vocabulary. Unrecognized input produces no event.

use crossterm::event::KeyCode;

pub const DIAL_MIN: u8 = 0;
pub const DIAL_MAX: u8 = 100;
pub const DEFAULT_DIAL_STEP: u8 = 5;

/// One of the four 90° sectors of the wheel, centered on the cardinal directions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    Top,
    Bottom,
    Left,
    Right,
}

impl Quadrant {
    /// Classify an angle in degrees, measured clockwise from 12 o'clock.
    /// Any finite angle is accepted; it is normalized into [0, 360).
    pub fn from_angle(angle_deg: f64) -> Option<Self> {
        if !angle_deg.is_finite() {
            return None;
        }
        let angle = angle_deg.rem_euclid(360.0);
        let quadrant = if !(45.0..315.0).contains(&angle) {
            Quadrant::Top
        } else if angle < 135.0 {
            Quadrant::Right
        } else if angle < 225.0 {
            Quadrant::Bottom
        } else {
            Quadrant::Left
        };
        Some(quadrant)
    }
}

/// Navigation vocabulary shared by the dial, the ring and the keyboard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelEvent {
    ForwardScroll,
    BackwardScroll,
    CenterClick,
    WheelClick(Quadrant),
    MenuClick,
}

impl WheelEvent {
    /// Event raised in addition to this one. A click on the top quadrant is
    /// also a menu click; nothing else derives a second event.
    pub fn derived(self) -> Option<WheelEvent> {
        match self {
            WheelEvent::WheelClick(Quadrant::Top) => Some(WheelEvent::MenuClick),
            _ => None,
        }
    }
}

/// What a key press means to the player
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Wheel(WheelEvent),
    /// Space bypasses the wheel and is bound to playback directly
    TogglePlayback,
}

impl KeyAction {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Up | KeyCode::Left => Some(KeyAction::Wheel(WheelEvent::BackwardScroll)),
            KeyCode::Down | KeyCode::Right => Some(KeyAction::Wheel(WheelEvent::ForwardScroll)),
            KeyCode::Enter => Some(KeyAction::Wheel(WheelEvent::CenterClick)),
            KeyCode::Esc => Some(KeyAction::Wheel(WheelEvent::WheelClick(Quadrant::Top))),
            KeyCode::Char(' ') => Some(KeyAction::TogglePlayback),
            _ => None,
        }
    }
}

fn angle_to_raw(angle_deg: f64) -> Option<u8> {
    if !angle_deg.is_finite() {
        return None;
    }
    let fraction = angle_deg.rem_euclid(360.0) / 360.0;
    Some((fraction * DIAL_MAX as f64).round() as u8)
}

/// Live dial position; remembers only the previous sample
#[derive(Clone, Debug)]
pub struct RotaryDecoder {
    value: u8,
    step: u8,
}

impl Default for RotaryDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_DIAL_STEP)
    }
}

impl RotaryDecoder {
    pub fn new(step: u8) -> Self {
        Self {
            value: DIAL_MIN,
            step: step.clamp(1, DIAL_MAX),
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    /// Snap a raw position onto the step grid inside [0, 100]. Both ends stay
    /// reachable even when the step does not divide 100.
    fn quantize(&self, raw: u8) -> u8 {
        if raw >= DIAL_MAX {
            return DIAL_MAX;
        }
        let raw = raw as u16;
        let step = self.step as u16;
        let snapped = (raw + step / 2) / step * step;
        snapped.min(DIAL_MAX as u16) as u8
    }

    /// Decode a new dial position against the previous one. The previous
    /// value is replaced even when no event comes out.
    pub fn decode_value(&mut self, raw: u8) -> Option<WheelEvent> {
        let previous = self.value;
        let value = self.quantize(raw);
        self.value = value;

        let event = if previous == DIAL_MAX && value == DIAL_MIN {
            Some(WheelEvent::ForwardScroll)
        } else if previous == DIAL_MIN && value == DIAL_MAX {
            Some(WheelEvent::BackwardScroll)
        } else if value > previous {
            Some(WheelEvent::ForwardScroll)
        } else if value < previous {
            Some(WheelEvent::BackwardScroll)
        } else {
            None
        };

        tracing::trace!(previous, value, event = ?event, "Dial moved");
        event
    }

    /// Decode a dial position given as an angle (clockwise from 12 o'clock)
    pub fn decode_angle(&mut self, angle_deg: f64) -> Option<WheelEvent> {
        angle_to_raw(angle_deg).and_then(|raw| self.decode_value(raw))
    }

    /// Put the dial under the pointer without decoding a move, e.g. when a
    /// drag starts somewhere else on the ring
    pub fn touch_angle(&mut self, angle_deg: f64) {
        if let Some(raw) = angle_to_raw(angle_deg) {
            self.value = self.quantize(raw);
        }
    }

    /// Turn the dial by one step, wrapping through the 0/100 seam
    pub fn turn(&mut self, clockwise: bool) -> Option<WheelEvent> {
        let next = if clockwise {
            if self.value >= DIAL_MAX {
                DIAL_MIN
            } else {
                self.value.saturating_add(self.step).min(DIAL_MAX)
            }
        } else if self.value == DIAL_MIN {
            DIAL_MAX
        } else {
            self.value.saturating_sub(self.step)
        };
        self.decode_value(next)
    }

    /// Classify a click on the ring. The decoder only classifies; what each
    /// quadrant does is up to the caller.
    pub fn decode_click(&self, angle_deg: f64) -> Option<WheelEvent> {
        Quadrant::from_angle(angle_deg).map(WheelEvent::WheelClick)
    }
}
