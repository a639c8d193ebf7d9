//! Playback position sync for the scrubber
//!
//! Local time moves optimistically when the user scrubs; the periodic refresh
//! overwrites it from the polled player snapshot.

use super::engine::{PlayerEngine, PlayerSnapshot};

/// Whether refresh or the user owns the displayed time
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncMode {
    #[default]
    Following,
    Scrubbing,
}

impl SyncMode {
    pub fn toggled(self) -> Self {
        match self {
            SyncMode::Following => SyncMode::Scrubbing,
            SyncMode::Scrubbing => SyncMode::Following,
        }
    }
}

/// Scrubber state in whole seconds. Keeps `current_time <= max_time`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionSync {
    current_time: u32,
    max_time: u32,
    mode: SyncMode,
}

impl PositionSync {
    /// Attach a scrubber. The initial refresh is forced so an in-progress
    /// session never shows zeros.
    pub fn attach(snapshot: Option<&PlayerSnapshot>) -> Self {
        let mut sync = Self::default();
        sync.refresh(false, true, snapshot);
        sync
    }

    pub fn current_time(&self) -> u32 {
        self.current_time
    }

    pub fn max_time(&self) -> u32 {
        self.max_time
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    pub fn is_scrubbing(&self) -> bool {
        self.mode == SyncMode::Scrubbing
    }

    pub fn set_mode(&mut self, mode: SyncMode) {
        tracing::debug!(mode = ?mode, "Scrub mode changed");
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggled());
    }

    pub fn remaining_time(&self) -> u32 {
        self.max_time - self.current_time
    }

    /// Progress in whole percent, 0 when the duration is unknown
    pub fn percent(&self) -> u16 {
        if self.max_time == 0 {
            return 0;
        }
        ((self.current_time as f64 / self.max_time as f64) * 100.0).round() as u16
    }

    pub fn scrub_forward(&mut self, engine: &dyn PlayerEngine) {
        if !self.is_scrubbing() || self.current_time == self.max_time {
            return;
        }
        let new_time = self.current_time + 1;
        if new_time <= self.max_time {
            self.seek_to(new_time, engine);
        }
    }

    pub fn scrub_backward(&mut self, engine: &dyn PlayerEngine) {
        if !self.is_scrubbing() || self.current_time == 0 {
            return;
        }
        if let Some(new_time) = self.current_time.checked_sub(1) {
            self.seek_to(new_time, engine);
        }
    }

    fn seek_to(&mut self, new_time: u32, engine: &dyn PlayerEngine) {
        tracing::trace!(from = self.current_time, to = new_time, "Scrubbing");
        engine.seek(new_time.saturating_mul(1000));
        self.current_time = new_time;
    }

    /// Overwrite the local time from the player when it is playing or when
    /// forced. A missing snapshot reads as zero.
    pub fn refresh(&mut self, playing: bool, force: bool, snapshot: Option<&PlayerSnapshot>) {
        if !playing && !force {
            return;
        }
        let position = snapshot.map(|s| s.position_ms).unwrap_or(0) / 1000;
        let duration = snapshot.map(|s| s.duration_ms).unwrap_or(0) / 1000;

        self.max_time = duration;
        self.current_time = position.min(duration);
    }

    /// Periodic refresh; time values are left alone while the user scrubs
    pub fn tick(&mut self, playing: bool, snapshot: Option<&PlayerSnapshot>) {
        if self.is_scrubbing() {
            return;
        }
        self.refresh(playing, false, snapshot);
    }
}
