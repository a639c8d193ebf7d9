//! Loading menu content into freshly opened windows

use crate::model::{tracks_id, AlbumItem, PlaylistItem, TrackList, View, COVER_FLOW_ID};
use super::AppController;

pub const PLAYLIST_LIMIT: u32 = 50;
pub const ALBUM_LIMIT: u32 = 50;

/// Content a window needs fetched after it was opened
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadRequest {
    Playlists,
    PlaylistTracks(PlaylistItem),
    SavedAlbums,
}

enum Loaded {
    Playlists(Vec<PlaylistItem>),
    Tracks(PlaylistItem, TrackList),
    Albums(Vec<AlbumItem>),
}

impl AppController {
    /// Fetch content without holding the model lock, then fill the window if
    /// it is still mounted
    pub async fn load(&self, request: LoadRequest) {
        let spotify = {
            let model = self.model.lock().await;
            model.get_spotify_client()
        };
        let Some(spotify) = spotify else {
            tracing::debug!(request = ?request, "No Spotify client, skipping load");
            return;
        };

        tracing::debug!(request = ?request, "Loading menu content");
        let result = match &request {
            LoadRequest::Playlists => spotify
                .get_user_playlists(PLAYLIST_LIMIT)
                .await
                .map(Loaded::Playlists),
            LoadRequest::PlaylistTracks(playlist) => spotify
                .get_playlist_tracks(playlist)
                .await
                .map(|list| Loaded::Tracks(playlist.clone(), list)),
            LoadRequest::SavedAlbums => spotify
                .get_saved_albums(ALBUM_LIMIT)
                .await
                .map(Loaded::Albums),
        };

        let mut model = self.model.lock().await;
        match result {
            Ok(loaded) => {
                let mut views: Vec<_> = model.windows_mut().views_mut().collect();
                fill_view(&mut views, loaded);
            }
            Err(e) => {
                tracing::error!(request = ?request, error = %e, "Failed to load menu content");
                for view in model.windows_mut().views_mut() {
                    match (&request, view) {
                        (LoadRequest::Playlists, View::Playlists { loading, .. })
                        | (LoadRequest::SavedAlbums, View::CoverFlow { loading, .. }) => {
                            *loading = false
                        }
                        _ => {}
                    }
                }
                // A track list that failed to load has nothing to show
                if let LoadRequest::PlaylistTracks(playlist) = &request {
                    model.windows_mut().remove(&tracks_id(&playlist.id));
                }
                model.set_error(Self::format_error(&e));
            }
        }
    }
}

fn fill_view(views: &mut [&mut View], loaded: Loaded) {
    match loaded {
        Loaded::Playlists(playlists) => {
            tracing::info!(count = playlists.len(), "Loaded playlists");
            for view in views.iter_mut() {
                if let View::Playlists { items, loading, .. } = &mut **view {
                    *items = playlists.clone();
                    *loading = false;
                }
            }
        }
        Loaded::Tracks(playlist, tracks) => {
            tracing::info!(
                playlist = %playlist.name,
                count = tracks.songs.len(),
                "Loaded playlist tracks"
            );
            for view in views.iter_mut() {
                if let View::Tracks { playlist: mounted, list, .. } = &mut **view {
                    if mounted.id == playlist.id {
                        *list = Some(tracks.clone());
                    }
                }
            }
        }
        Loaded::Albums(albums) => {
            tracing::info!(count = albums.len(), window = COVER_FLOW_ID, "Loaded saved albums");
            for view in views.iter_mut() {
                if let View::CoverFlow { albums: mounted, loading, .. } = &mut **view {
                    *mounted = albums.clone();
                    *loading = false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::song;

    #[test]
    fn test_fill_view_only_touches_matching_windows() {
        let (_, mut playlists) = View::playlists();
        let (_, mut tracks) = View::tracks(PlaylistItem {
            id: "a".to_string(),
            name: "A".to_string(),
        });

        let list = TrackList {
            context_uri: "spotify:playlist:b".to_string(),
            title: "B".to_string(),
            songs: vec![song("X")],
        };
        let other = PlaylistItem {
            id: "b".to_string(),
            name: "B".to_string(),
        };
        fill_view(&mut [&mut playlists, &mut tracks], Loaded::Tracks(other, list));
        assert!(tracks.is_loading());
        assert!(playlists.is_loading());

        let items = vec![PlaylistItem {
            id: "a".to_string(),
            name: "A".to_string(),
        }];
        fill_view(&mut [&mut playlists, &mut tracks], Loaded::Playlists(items));
        assert!(!playlists.is_loading());
        assert_eq!(playlists.rows(), vec!["A"]);
    }

    #[test]
    fn test_fill_view_sets_cover_flow_albums() {
        let (_, mut cover_flow) = View::cover_flow();
        let album = AlbumItem {
            uri: "spotify:album:x".to_string(),
            name: "X".to_string(),
            artist: "Artist".to_string(),
            songs: vec![song("A")],
        };
        fill_view(&mut [&mut cover_flow], Loaded::Albums(vec![album]));
        assert!(!cover_flow.is_loading());
        assert_eq!(cover_flow.rows(), vec!["X"]);
    }
}
