//! Spotify API client wrapper with the calls the player needs

use anyhow::Result;
use rspotify::{
    model::{
        AlbumId, ArtistId, FullTrack, Image, PlayContextId, PlayableItem, PlaylistId,
        SimplifiedArtist,
    },
    prelude::*,
    AuthCodeSpotify, Token,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::engine::PlayerSnapshot;
use super::session::Song;
use super::types::{AlbumItem, PlaylistItem, TrackList};

/// Spotify API client with token refresh support
#[derive(Clone)]
pub struct SpotifyClient {
    client: Arc<AuthCodeSpotify>,
    local_device_name: Option<String>,
    refresh_token: Arc<RwLock<String>>,
    token_expires_at: Arc<RwLock<Option<chrono::DateTime<chrono::Utc>>>>,
}

/// Milliseconds of an API duration, clamped to what the player tracks
fn millis(duration: chrono::Duration) -> u32 {
    u32::try_from(duration.num_milliseconds().max(0)).unwrap_or(u32::MAX)
}

fn first_artist(artists: &[SimplifiedArtist]) -> String {
    artists.first().map(|a| a.name.clone()).unwrap_or_default()
}

fn first_image(images: &[Image]) -> String {
    images.first().map(|i| i.url.clone()).unwrap_or_default()
}

fn song_from_track(track: &FullTrack) -> Option<Song> {
    let id = track.id.as_ref()?.id().to_string();
    Some(Song {
        url: format!("spotify:track:{}", id),
        id,
        name: track.name.clone(),
        artist: first_artist(&track.artists),
        album: track.album.name.clone(),
        artwork: first_image(&track.album.images),
        track: track.track_number,
    })
}

impl SpotifyClient {
    pub const PLAYLIST_PAGE_SIZE: usize = 100;

    pub fn new(
        client: AuthCodeSpotify,
        local_device_name: Option<String>,
        refresh_token: String,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Self {
        Self {
            client: Arc::new(client),
            local_device_name,
            refresh_token: Arc::new(RwLock::new(refresh_token)),
            token_expires_at: Arc::new(RwLock::new(expires_at)),
        }
    }

    pub async fn token_needs_refresh(&self) -> bool {
        let expires_at = self.token_expires_at.read().await;
        if let Some(exp) = *expires_at {
            let remaining = exp - chrono::Utc::now();
            // Refresh if less than 5 minutes remaining
            remaining.num_seconds() < 300
        } else {
            false
        }
    }

    pub async fn refresh_token_if_needed(
        &self,
        client_id: &str,
        redirect_uri: &str,
    ) -> Result<bool> {
        if !self.token_needs_refresh().await {
            return Ok(false);
        }

        let refresh_token = self.refresh_token.read().await.clone();
        tracing::info!("Token expiring soon, refreshing...");

        let refreshed =
            crate::auth::refresh_access_token(client_id, redirect_uri, &refresh_token).await?;

        let new_token = Token {
            access_token: refreshed.access_token,
            expires_in: chrono::Duration::seconds(3600),
            expires_at: Some(refreshed.expires_at),
            scopes: crate::auth::SCOPES
                .split_whitespace()
                .map(|s| s.to_string())
                .collect::<HashSet<String>>(),
            refresh_token: None,
        };

        let mut token = self
            .client
            .token
            .lock()
            .await
            .map_err(|_| anyhow::anyhow!("Token lock poisoned"))?;
        *token = Some(new_token);
        drop(token);

        *self.refresh_token.write().await = refreshed.refresh_token;
        *self.token_expires_at.write().await = Some(refreshed.expires_at);

        tracing::info!("Token refreshed successfully");
        Ok(true)
    }

    pub async fn get_player_snapshot(&self) -> Result<Option<PlayerSnapshot>> {
        tracing::trace!("Fetching current playback state");
        let Some(playback) = self.client.current_playback(None, None::<Vec<_>>).await? else {
            return Ok(None);
        };

        let (duration_ms, track_uri) = match &playback.item {
            Some(PlayableItem::Track(track)) => (
                millis(track.duration),
                track.id.as_ref().map(|id| format!("spotify:track:{}", id.id())),
            ),
            Some(PlayableItem::Episode(episode)) => (
                millis(episode.duration),
                Some(format!("spotify:episode:{}", episode.id.id())),
            ),
            _ => (0, None),
        };

        Ok(Some(PlayerSnapshot {
            position_ms: playback.progress.map(millis).unwrap_or(0),
            duration_ms,
            is_playing: playback.is_playing,
            track_uri,
        }))
    }

    async fn get_device_id(&self) -> Option<String> {
        if let Ok(devices) = self.client.device().await {
            if let Some(device) = devices.iter().find(|d| d.is_active) {
                tracing::debug!(
                    device_name = %device.name,
                    device_id = ?device.id,
                    "Found active device"
                );
                return device.id.clone();
            }

            // No active device - try to find our local device as fallback
            if let Some(local_name) = &self.local_device_name {
                if let Some(device) = devices.iter().find(|d| &d.name == local_name) {
                    tracing::debug!(
                        device_name = %device.name,
                        device_id = ?device.id,
                        "No active device, using local device as fallback"
                    );
                    return device.id.clone();
                }
            }

            tracing::debug!(
                available_devices = devices.len(),
                "No active device found and local device not in list"
            );
            None
        } else {
            tracing::debug!("Failed to get devices list");
            None
        }
    }

    pub async fn play(&self) -> Result<()> {
        let device_id = self.get_device_id().await;
        tracing::debug!(device_id = ?device_id, "API: resume_playback");
        self.client
            .resume_playback(device_id.as_deref(), None)
            .await?;
        Ok(())
    }

    pub async fn pause(&self) -> Result<()> {
        let device_id = self.get_device_id().await;
        tracing::debug!(device_id = ?device_id, "API: pause_playback");
        self.client.pause_playback(device_id.as_deref()).await?;
        Ok(())
    }

    pub async fn next_track(&self) -> Result<()> {
        let device_id = self.get_device_id().await;
        tracing::debug!(device_id = ?device_id, "API: next_track");
        self.client.next_track(device_id.as_deref()).await?;
        Ok(())
    }

    pub async fn previous_track(&self) -> Result<()> {
        let device_id = self.get_device_id().await;
        tracing::debug!(device_id = ?device_id, "API: previous_track");
        self.client.previous_track(device_id.as_deref()).await?;
        Ok(())
    }

    pub async fn seek(&self, position_ms: u32) -> Result<()> {
        let device_id = self.get_device_id().await;
        tracing::debug!(position_ms, device_id = ?device_id, "API: seek_track");
        self.client
            .seek_track(chrono::Duration::milliseconds(i64::from(position_ms)), device_id.as_deref())
            .await?;
        Ok(())
    }

    pub async fn play_context_from_track_uri(
        &self,
        context_uri: &str,
        track_uri: &str,
    ) -> Result<()> {
        let device_id = self.get_device_id().await;
        tracing::debug!(
            context_uri,
            track_uri,
            device_id = ?device_id,
            "API: start_context_playback"
        );

        let id = context_uri.rsplit(':').next().unwrap_or("");
        let play_context = if context_uri.contains(":album:") {
            PlayContextId::Album(AlbumId::from_id(id)?)
        } else if context_uri.contains(":playlist:") {
            PlayContextId::Playlist(PlaylistId::from_id(id)?)
        } else if context_uri.contains(":artist:") {
            PlayContextId::Artist(ArtistId::from_id(id)?)
        } else {
            return Err(anyhow::anyhow!("Unknown context type: {}", context_uri));
        };

        let offset = rspotify::model::Offset::Uri(track_uri.to_string());

        self.client
            .start_context_playback(play_context, device_id.as_deref(), Some(offset), None)
            .await?;
        Ok(())
    }

    pub async fn get_user_playlists(&self, limit: u32) -> Result<Vec<PlaylistItem>> {
        use futures::{StreamExt, TryStreamExt};

        let playlists: Vec<_> = self
            .client
            .current_user_playlists()
            .take(limit as usize)
            .try_collect()
            .await?;

        Ok(playlists
            .into_iter()
            .map(|playlist| PlaylistItem {
                id: playlist.id.id().to_string(),
                name: playlist.name,
            })
            .collect())
    }

    pub async fn get_playlist_tracks(&self, playlist: &PlaylistItem) -> Result<TrackList> {
        use futures::{StreamExt, TryStreamExt};

        let id = PlaylistId::from_id(playlist.id.as_str())?;
        let items: Vec<_> = self
            .client
            .playlist_items(id, None, None)
            .take(Self::PLAYLIST_PAGE_SIZE)
            .try_collect()
            .await?;

        let songs: Vec<Song> = items
            .iter()
            .filter_map(|item| match &item.track {
                Some(PlayableItem::Track(track)) => song_from_track(track),
                _ => None,
            })
            .collect();

        tracing::info!(playlist = %playlist.name, songs = songs.len(), "Loaded playlist tracks");

        Ok(TrackList {
            context_uri: format!("spotify:playlist:{}", playlist.id),
            title: playlist.name.clone(),
            songs,
        })
    }

    /// Saved albums with their first page of tracks, for cover flow
    pub async fn get_saved_albums(&self, limit: u32) -> Result<Vec<AlbumItem>> {
        use futures::{StreamExt, TryStreamExt};

        let saved: Vec<_> = self
            .client
            .current_user_saved_albums(None)
            .take(limit as usize)
            .try_collect()
            .await?;

        let albums = saved
            .into_iter()
            .map(|saved| {
                let album = saved.album;
                let artist = first_artist(&album.artists);
                let artwork = first_image(&album.images);
                let songs = album
                    .tracks
                    .items
                    .iter()
                    .filter_map(|track| {
                        let id = track.id.as_ref()?.id().to_string();
                        Some(Song {
                            url: format!("spotify:track:{}", id),
                            id,
                            name: track.name.clone(),
                            artist: first_artist(&track.artists),
                            album: album.name.clone(),
                            artwork: artwork.clone(),
                            track: track.track_number,
                        })
                    })
                    .collect();

                AlbumItem {
                    uri: format!("spotify:album:{}", album.id.id()),
                    name: album.name.clone(),
                    artist,
                    songs,
                }
            })
            .collect::<Vec<_>>();

        tracing::info!(count = albums.len(), "Loaded saved albums");
        Ok(albums)
    }
}
