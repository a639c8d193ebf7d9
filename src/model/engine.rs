//! External capabilities the player core talks to
//!
//! - `PlayerEngine`: the audio engine (commands plus a polled snapshot)
//! - `TitleSink`: where the current song title is published
//! - `SpotifyEngine`: `PlayerEngine` backed by the Spotify Web API

use std::time::Duration;
use tokio::sync::{mpsc, watch};

use super::session::Song;
use super::spotify_client::SpotifyClient;

/// Latest known state of the external player
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub position_ms: u32,
    pub duration_ms: u32,
    pub is_playing: bool,
    pub track_uri: Option<String>,
}

/// Fire-and-forget commands against the audio engine. Implementations must
/// not block the caller.
pub trait PlayerEngine: Send + Sync {
    fn seek(&self, position_ms: u32);
    /// Resume when `resume` is set, pause otherwise
    fn toggle_playback(&self, resume: bool);
    fn skip_next(&self);
    fn skip_previous(&self);
    /// Start `song` inside its playlist or album context
    fn start(&self, context_uri: &str, song: &Song);
    fn snapshot(&self) -> Option<PlayerSnapshot>;
}

pub trait TitleSink {
    fn set_song_title(&self, song: Option<&Song>);
}

/// Drives Spotify through the Web API. Each command runs on its own task;
/// failures are logged and forwarded to `errors`.
#[derive(Clone)]
pub struct SpotifyEngine {
    spotify: SpotifyClient,
    snapshot: watch::Receiver<Option<PlayerSnapshot>>,
    errors: mpsc::UnboundedSender<anyhow::Error>,
}

impl SpotifyEngine {
    /// Create the engine and start polling the player every `poll_interval`
    pub fn spawn(
        spotify: SpotifyClient,
        poll_interval: Duration,
        errors: mpsc::UnboundedSender<anyhow::Error>,
    ) -> Self {
        let (tx, rx) = watch::channel(None);
        let poller = spotify.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                match poller.get_player_snapshot().await {
                    Ok(snapshot) => {
                        if tx.send(snapshot).is_err() {
                            tracing::debug!("Snapshot receivers gone, stopping poller");
                            break;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "Failed to poll player state"),
                }
            }
        });

        Self {
            spotify,
            snapshot: rx,
            errors,
        }
    }

    fn run<F, Fut>(&self, operation: &'static str, command: F)
    where
        F: FnOnce(SpotifyClient) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let spotify = self.spotify.clone();
        let errors = self.errors.clone();
        tokio::spawn(async move {
            let result = command(spotify).await;
            crate::log_api_result!(operation, result);
            if let Err(e) = result {
                let _ = errors.send(e);
            }
        });
    }
}

impl PlayerEngine for SpotifyEngine {
    fn seek(&self, position_ms: u32) {
        self.run("seek", move |spotify| async move { spotify.seek(position_ms).await });
    }

    fn toggle_playback(&self, resume: bool) {
        self.run("toggle_playback", move |spotify| async move {
            if resume {
                spotify.play().await
            } else {
                spotify.pause().await
            }
        });
    }

    fn skip_next(&self) {
        self.run("next_track", |spotify| async move { spotify.next_track().await });
    }

    fn skip_previous(&self) {
        self.run("previous_track", |spotify| async move {
            spotify.previous_track().await
        });
    }

    fn start(&self, context_uri: &str, song: &Song) {
        let context_uri = context_uri.to_string();
        let track_uri = song.url.clone();
        self.run("start_context_playback", move |spotify| async move {
            spotify
                .play_context_from_track_uri(&context_uri, &track_uri)
                .await
        });
    }

    fn snapshot(&self) -> Option<PlayerSnapshot> {
        self.snapshot.borrow().clone()
    }
}
