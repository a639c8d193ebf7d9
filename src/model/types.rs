//! Core type definitions for the application

use std::time::Instant;

use super::session::Song;

/// A user's playlist (for the Playlists menu)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistItem {
    pub id: String,
    pub name: String,
}

/// A saved album, browsed in cover flow
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlbumItem {
    pub uri: String,
    pub name: String,
    pub artist: String,
    pub songs: Vec<Song>,
}

/// Songs of one playback context (playlist or album)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackList {
    pub context_uri: String,
    pub title: String,
    pub songs: Vec<Song>,
}

/// Entries of the root menu
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HomeEntry {
    Playlists,
    CoverFlow,
    NowPlaying,
}

impl HomeEntry {
    pub const ALL: [HomeEntry; 3] = [
        HomeEntry::Playlists,
        HomeEntry::CoverFlow,
        HomeEntry::NowPlaying,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HomeEntry::Playlists => "Playlists",
            HomeEntry::CoverFlow => "Cover Flow",
            HomeEntry::NowPlaying => "Now Playing",
        }
    }
}

/// Transient error banner
#[derive(Clone, Debug, Default)]
pub struct ErrorBanner {
    pub message: Option<String>,
    pub timestamp: Option<Instant>,
}
