//! Model module - Application state and data types
//!
//! This module contains the player core and the state around it.
//! It is organized into submodules by responsibility:
//!
//! - `wheel`: Rotary input decoding (dial, ring clicks, keys)
//! - `scrub`: Playback position sync for the scrubber
//! - `session`: Audio session state machine (playlist, current song)
//! - `windows`: Window stack and derived visibility
//! - `views`: State of the view mounted in each window
//! - `engine`: External player and title capabilities
//! - `types`: Menu data types
//! - `spotify_client`: Spotify API client wrapper
//! - `app_model`: Main application model

mod types;
mod views;
mod wheel;
mod scrub;
mod session;
mod windows;
mod engine;
mod spotify_client;
mod app_model;

pub use types::{AlbumItem, HomeEntry, PlaylistItem, TrackList};

pub use views::{tracks_id, View, COVER_FLOW_ID, HOME_ID, NOW_PLAYING_ID};

pub use wheel::{KeyAction, Quadrant, RotaryDecoder, WheelEvent, DEFAULT_DIAL_STEP};

pub use scrub::{PositionSync, SyncMode};

pub use session::Song;

pub use windows::{WindowLayout, WindowType};

pub use engine::{PlayerEngine, PlayerSnapshot, SpotifyEngine, TitleSink};

pub use spotify_client::SpotifyClient;

pub use app_model::AppModel;

#[cfg(test)]
pub(crate) mod testing {
    pub(crate) use super::scrub::tests::{EngineCall, MockEngine};
    pub(crate) use super::session::tests::{song, RecordingTitle};
}
