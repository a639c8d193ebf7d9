//! Main application model with state management

use std::time::{Duration, Instant};

use super::engine::{PlayerSnapshot, TitleSink};
use super::scrub::PositionSync;
use super::session::AudioSession;
use super::spotify_client::SpotifyClient;
use super::types::ErrorBanner;
use super::views::{HOME_ID, NOW_PLAYING_ID, View};
use super::wheel::RotaryDecoder;
use super::windows::{Window, WindowStack};

const ERROR_DISPLAY_DURATION: Duration = Duration::from_secs(5);

/// Main application model containing all state
pub struct AppModel {
    pub spotify: Option<SpotifyClient>,
    session: AudioSession,
    windows: WindowStack<View>,
    wheel: RotaryDecoder,
    error: ErrorBanner,
    device_name: String,
    should_quit: bool,
}

impl AppModel {
    pub fn new(title: Box<dyn TitleSink + Send>, dial_step: u8) -> Self {
        let mut windows = WindowStack::default();
        let (window, view) = View::home();
        windows.push(window, view);

        Self {
            spotify: None,
            session: AudioSession::new(title),
            windows,
            wheel: RotaryDecoder::new(dial_step),
            error: ErrorBanner::default(),
            device_name: String::new(),
            should_quit: false,
        }
    }

    pub fn set_spotify_client(&mut self, client: SpotifyClient) {
        self.spotify = Some(client);
    }

    pub fn get_spotify_client(&self) -> Option<SpotifyClient> {
        self.spotify.clone()
    }

    // ========================================================================
    // Session & Input
    // ========================================================================

    pub fn session(&self) -> &AudioSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut AudioSession {
        &mut self.session
    }

    pub fn wheel_mut(&mut self) -> &mut RotaryDecoder {
        &mut self.wheel
    }

    pub fn wheel(&self) -> &RotaryDecoder {
        &self.wheel
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn update_device_name(&mut self, name: String) {
        self.device_name = name;
    }

    // ========================================================================
    // Windows
    // ========================================================================

    pub fn windows(&self) -> &WindowStack<View> {
        &self.windows
    }

    pub fn windows_mut(&mut self) -> &mut WindowStack<View> {
        &mut self.windows
    }

    /// Register a window, replacing any existing window with the same id
    pub fn open_window(&mut self, window: Window, view: View) {
        self.windows.remove(&window.id);
        self.windows.push(window, view);
    }

    pub fn focused_view_mut(&mut self) -> Option<&mut View> {
        let id = self.windows.focused_id()?;
        self.windows.view_mut(&id)
    }

    /// Hide the focused window. The root menu always stays.
    pub fn close_focused(&mut self) -> bool {
        match self.windows.focused_id() {
            Some(id) if id != HOME_ID => {
                let closed = self.windows.remove(&id).is_some();
                tracing::debug!(id = %id, remaining = self.windows.len(), "Closed focused window");
                closed
            }
            _ => false,
        }
    }

    /// Mount the now-playing window with a freshly synced scrubber
    pub fn open_now_playing(&mut self, snapshot: Option<&PlayerSnapshot>) {
        let (window, view) = View::now_playing(PositionSync::attach(snapshot));
        self.open_window(window, view);
    }

    pub fn now_playing_sync(&self) -> Option<&PositionSync> {
        match self.windows.view(NOW_PLAYING_ID) {
            Some(View::NowPlaying { sync }) => Some(sync),
            _ => None,
        }
    }

    /// Periodic reconciliation with the polled player
    pub fn tick(&mut self, snapshot: Option<&PlayerSnapshot>) {
        if let Some(snapshot) = snapshot {
            self.session.reconcile(snapshot, Instant::now());
        }

        let playing = self.session.is_playing();
        for view in self.windows.views_mut() {
            if let View::NowPlaying { sync } = view {
                sync.tick(playing, snapshot);
            }
        }
    }

    // ========================================================================
    // Errors & Lifecycle
    // ========================================================================

    pub fn set_error(&mut self, message: String) {
        tracing::warn!(message = %message, "Showing error");
        self.error.message = Some(message);
        self.error.timestamp = Some(Instant::now());
    }

    pub fn clear_error(&mut self) {
        self.error = ErrorBanner::default();
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.message.as_deref()
    }

    pub fn auto_clear_old_errors(&mut self) {
        if let Some(timestamp) = self.error.timestamp {
            if timestamp.elapsed() >= ERROR_DISPLAY_DURATION {
                self.clear_error();
            }
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn set_should_quit(&mut self, quit: bool) {
        self.should_quit = quit;
    }
}
