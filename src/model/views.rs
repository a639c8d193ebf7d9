//! State of the view mounted in each window

use super::scrub::PositionSync;
use super::types::{AlbumItem, HomeEntry, PlaylistItem, TrackList};
use super::windows::{Window, WindowType};

pub const HOME_ID: &str = "home";
pub const PLAYLISTS_ID: &str = "playlists";
pub const NOW_PLAYING_ID: &str = "now-playing";
pub const COVER_FLOW_ID: &str = "cover-flow";

pub fn tracks_id(playlist_id: &str) -> String {
    format!("tracks:{}", playlist_id)
}

/// A selectable list that stops at both ends
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
}

impl Selection {
    pub fn step(&mut self, forward: bool, len: usize) {
        if len == 0 {
            self.index = 0;
        } else if forward {
            self.index = (self.index + 1).min(len - 1);
        } else {
            self.index = self.index.saturating_sub(1);
        }
    }
}

#[derive(Clone, Debug)]
pub enum View {
    Home {
        selection: Selection,
    },
    Playlists {
        items: Vec<PlaylistItem>,
        selection: Selection,
        loading: bool,
    },
    Tracks {
        playlist: PlaylistItem,
        list: Option<TrackList>,
        selection: Selection,
    },
    NowPlaying {
        sync: PositionSync,
    },
    CoverFlow {
        albums: Vec<AlbumItem>,
        selection: Selection,
        loading: bool,
    },
}

impl View {
    pub fn home() -> (Window, View) {
        (
            Window::new(HOME_ID, WindowType::Split),
            View::Home {
                selection: Selection::default(),
            },
        )
    }

    pub fn playlists() -> (Window, View) {
        (
            Window::new(PLAYLISTS_ID, WindowType::Split),
            View::Playlists {
                items: Vec::new(),
                selection: Selection::default(),
                loading: true,
            },
        )
    }

    pub fn tracks(playlist: PlaylistItem) -> (Window, View) {
        (
            Window::new(tracks_id(&playlist.id), WindowType::Split),
            View::Tracks {
                playlist,
                list: None,
                selection: Selection::default(),
            },
        )
    }

    pub fn now_playing(sync: PositionSync) -> (Window, View) {
        (
            Window::new(NOW_PLAYING_ID, WindowType::Full),
            View::NowPlaying { sync },
        )
    }

    pub fn cover_flow() -> (Window, View) {
        (
            Window::new(COVER_FLOW_ID, WindowType::CoverFlow),
            View::CoverFlow {
                albums: Vec::new(),
                selection: Selection::default(),
                loading: true,
            },
        )
    }

    pub fn title(&self) -> String {
        match self {
            View::Home { .. } => "iPod".to_string(),
            View::Playlists { .. } => "Playlists".to_string(),
            View::Tracks { playlist, .. } => playlist.name.clone(),
            View::NowPlaying { .. } => "Now Playing".to_string(),
            View::CoverFlow { .. } => "Cover Flow".to_string(),
        }
    }

    /// Labels of the selectable rows, for list-style views
    pub fn rows(&self) -> Vec<String> {
        match self {
            View::Home { .. } => HomeEntry::ALL.iter().map(|e| e.label().to_string()).collect(),
            View::Playlists { items, .. } => items.iter().map(|p| p.name.clone()).collect(),
            View::Tracks { list, .. } => list
                .as_ref()
                .map(|l| l.songs.iter().map(|s| s.name.clone()).collect())
                .unwrap_or_default(),
            View::CoverFlow { albums, .. } => albums.iter().map(|a| a.name.clone()).collect(),
            View::NowPlaying { .. } => Vec::new(),
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        match self {
            View::Home { selection }
            | View::Playlists { selection, .. }
            | View::Tracks { selection, .. }
            | View::CoverFlow { selection, .. } => Some(selection),
            View::NowPlaying { .. } => None,
        }
    }

    /// Move the highlighted row. Views without rows ignore this.
    pub fn move_selection(&mut self, forward: bool) {
        let len = self.rows().len();
        match self {
            View::Home { selection }
            | View::Playlists { selection, .. }
            | View::Tracks { selection, .. }
            | View::CoverFlow { selection, .. } => selection.step(forward, len),
            View::NowPlaying { .. } => {}
        }
    }

    pub fn is_loading(&self) -> bool {
        match self {
            View::Playlists { loading, .. } | View::CoverFlow { loading, .. } => *loading,
            View::Tracks { list, .. } => list.is_none(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_stops_at_ends() {
        let mut selection = Selection::default();
        selection.step(false, 3);
        assert_eq!(selection.index, 0);
        selection.step(true, 3);
        selection.step(true, 3);
        selection.step(true, 3);
        assert_eq!(selection.index, 2);
        selection.step(true, 0);
        assert_eq!(selection.index, 0);
    }

    #[test]
    fn test_home_rows_and_movement() {
        let (window, mut view) = View::home();
        assert_eq!(window.kind, WindowType::Split);
        assert_eq!(view.rows(), vec!["Playlists", "Cover Flow", "Now Playing"]);

        view.move_selection(true);
        assert_eq!(view.selection().map(|s| s.index), Some(1));
    }

    #[test]
    fn test_loading_views() {
        let (_, playlists) = View::playlists();
        assert!(playlists.is_loading());

        let (window, tracks) = View::tracks(PlaylistItem {
            id: "abc".to_string(),
            name: "Mix".to_string(),
        });
        assert_eq!(window.id, "tracks:abc");
        assert!(tracks.is_loading());
        assert_eq!(tracks.title(), "Mix");
    }
}
