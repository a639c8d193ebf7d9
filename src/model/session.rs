//! Audio session state: playlist, current song and playing/loading flags

use std::time::{Duration, Instant};

use super::engine::{PlayerSnapshot, TitleSink};

/// How long a local transition outranks a player that still reports the
/// state from before it
pub const PENDING_TIMEOUT: Duration = Duration::from_secs(3);

/// A playable song. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Song {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub artwork: String,
    pub track: u32,
    /// Spotify URI of the track
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AudioState {
    pub playing: bool,
    pub loading: bool,
    pub playlist: Vec<Song>,
    pub song_index: usize,
    pub source: Option<Song>,
    pub uri: Option<String>,
}

/// A local transition the external player has not reported back yet
#[derive(Clone, Debug, PartialEq, Eq)]
struct Pending {
    track_uri: Option<String>,
    playing: bool,
    since: Instant,
}

impl Pending {
    fn confirmed_by(&self, snapshot: &PlayerSnapshot) -> bool {
        let track_matches = match &snapshot.track_uri {
            Some(uri) => self.track_uri.as_deref() == Some(uri.as_str()),
            None => true,
        };
        track_matches && snapshot.is_playing == self.playing
    }
}

/// Owns the `AudioState` and applies the playback transitions.
///
/// Boundary calls that do not apply (toggling with nothing loaded, going back
/// from the first track) leave the state untouched.
pub struct AudioSession {
    state: AudioState,
    title: Box<dyn TitleSink + Send>,
    pending: Option<Pending>,
}

impl AudioSession {
    pub fn new(title: Box<dyn TitleSink + Send>) -> Self {
        Self {
            state: AudioState::default(),
            title,
            pending: None,
        }
    }

    /// Remember the state a user transition asked the player for
    fn expect_player(&mut self) {
        self.pending = Some(Pending {
            track_uri: self.state.source.as_ref().map(|s| s.url.clone()),
            playing: self.state.playing,
            since: Instant::now(),
        });
    }

    pub fn state(&self) -> &AudioState {
        &self.state
    }

    pub fn source(&self) -> Option<&Song> {
        self.state.source.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    /// Load a playlist and start at `index`. An index past the end loads the
    /// playlist without a source and without playing.
    pub fn play(&mut self, playlist: Vec<Song>, index: usize) {
        let source = playlist.get(index).cloned();
        tracing::debug!(
            songs = playlist.len(),
            index,
            song = source.as_ref().map(|s| s.name.as_str()),
            "Session play"
        );

        self.state.playing = source.is_some();
        self.state.playlist = playlist;
        self.state.song_index = index;
        self.state.source = source;
        self.title.set_song_title(self.state.source.as_ref());
        self.expect_player();
    }

    pub fn toggle_pause(&mut self) {
        if self.state.source.is_none() {
            return;
        }
        self.state.playing = !self.state.playing;
        tracing::debug!(playing = self.state.playing, "Session toggled pause");
        self.expect_player();
    }

    /// Advance to the next song. Running past the last song clears the
    /// source and stops, leaving the playlist and index as they were.
    pub fn next_song(&mut self) {
        if self.step_next() {
            self.expect_player();
        }
    }

    pub fn prev_song(&mut self) {
        if self.step_prev() {
            self.expect_player();
        }
    }

    fn step_next(&mut self) -> bool {
        if self.state.source.is_none() {
            return false;
        }

        let next_index = self.state.song_index + 1;
        match self.state.playlist.get(next_index).cloned() {
            Some(song) => {
                self.state.song_index = next_index;
                self.state.source = Some(song);
                self.state.playing = true;
            }
            None => {
                tracing::debug!(index = self.state.song_index, "Playlist exhausted");
                self.state.source = None;
                self.state.playing = false;
            }
        }
        self.title.set_song_title(self.state.source.as_ref());
        true
    }

    fn step_prev(&mut self) -> bool {
        if self.state.source.is_none() || self.state.song_index == 0 {
            return false;
        }

        let prev_index = self.state.song_index - 1;
        let Some(song) = self.state.playlist.get(prev_index).cloned() else {
            return false;
        };
        self.state.song_index = prev_index;
        self.state.source = Some(song);
        self.state.playing = true;
        self.title.set_song_title(self.state.source.as_ref());
        true
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.state.loading = loading;
    }

    /// Set the playing flag; the URI is only replaced when one is given
    pub fn set_playing(&mut self, playing: bool, uri: Option<String>) {
        self.state.playing = playing;
        if let Some(uri) = uri {
            self.state.uri = Some(uri);
        }
    }

    /// Follow the external player onto a neighbouring track of the playlist
    pub fn follow_track(&mut self, track_uri: &str) {
        let Some(source) = &self.state.source else {
            return;
        };
        if source.url == track_uri {
            return;
        }

        let index = self.state.song_index;
        let next = self.state.playlist.get(index + 1);
        let prev = index.checked_sub(1).and_then(|i| self.state.playlist.get(i));

        if next.is_some_and(|song| song.url == track_uri) {
            tracing::debug!(track_uri, "Following external player to next song");
            self.step_next();
        } else if prev.is_some_and(|song| song.url == track_uri) {
            tracing::debug!(track_uri, "Following external player to previous song");
            self.step_prev();
        }
    }

    /// Reconcile with a polled player snapshot. Only applies while a source
    /// is loaded. A snapshot that still disagrees with a pending local
    /// transition is stale and ignored until `PENDING_TIMEOUT` has passed.
    pub fn reconcile(&mut self, snapshot: &PlayerSnapshot, now: Instant) {
        if self.state.source.is_none() {
            return;
        }

        if let Some(pending) = &self.pending {
            let waited = now.saturating_duration_since(pending.since);
            if !pending.confirmed_by(snapshot) && waited < PENDING_TIMEOUT {
                tracing::trace!(
                    track_uri = ?snapshot.track_uri,
                    is_playing = snapshot.is_playing,
                    "Ignoring stale player snapshot"
                );
                return;
            }
            self.pending = None;
        }

        if let Some(uri) = &snapshot.track_uri {
            self.follow_track(uri);
        }
        self.set_playing(snapshot.is_playing, snapshot.track_uri.clone());
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every title change
    #[derive(Clone, Default)]
    pub(crate) struct RecordingTitle {
        pub titles: Arc<Mutex<Vec<Option<String>>>>,
    }

    impl TitleSink for RecordingTitle {
        fn set_song_title(&self, song: Option<&Song>) {
            self.titles.lock().unwrap().push(song.map(|s| s.name.clone()));
        }
    }

    pub(crate) fn song(name: &str) -> Song {
        Song {
            id: name.to_lowercase(),
            name: name.to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            artwork: String::new(),
            track: 1,
            url: format!("spotify:track:{}", name.to_lowercase()),
        }
    }

    fn session() -> (AudioSession, RecordingTitle) {
        let title = RecordingTitle::default();
        (AudioSession::new(Box::new(title.clone())), title)
    }

    #[test]
    fn test_play_sets_source_and_title() {
        let (mut session, title) = session();
        session.play(vec![song("A"), song("B")], 1);

        let state = session.state();
        assert!(state.playing);
        assert_eq!(state.song_index, 1);
        assert_eq!(state.source, Some(song("B")));
        assert_eq!(*title.titles.lock().unwrap(), vec![Some("B".to_string())]);
    }

    #[test]
    fn test_next_song_scenario() {
        let (mut session, title) = session();
        session.play(vec![song("A"), song("B")], 0);

        session.next_song();
        assert_eq!(session.state().source, Some(song("B")));
        assert_eq!(session.state().song_index, 1);
        assert!(session.is_playing());

        session.next_song();
        assert_eq!(session.state().source, None);
        assert!(!session.is_playing());
        assert_eq!(session.state().song_index, 1);
        assert_eq!(session.state().playlist.len(), 2);

        assert_eq!(
            *title.titles.lock().unwrap(),
            vec![Some("A".to_string()), Some("B".to_string()), None]
        );
    }

    #[test]
    fn test_next_song_without_source_is_no_op() {
        let (mut session, _) = session();
        session.next_song();
        assert_eq!(*session.state(), AudioState::default());
    }

    #[test]
    fn test_prev_song_at_first_track_is_no_op() {
        let (mut session, title) = session();
        session.play(vec![song("A"), song("B")], 0);
        session.toggle_pause();
        let before = session.state().clone();

        session.prev_song();
        assert_eq!(*session.state(), before);
        assert!(!session.is_playing());
        assert_eq!(title.titles.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_prev_song_forces_playing() {
        let (mut session, _) = session();
        session.play(vec![song("A"), song("B")], 1);
        session.toggle_pause();

        session.prev_song();
        assert_eq!(session.state().song_index, 0);
        assert_eq!(session.state().source, Some(song("A")));
        assert!(session.is_playing());
    }

    #[test]
    fn test_toggle_pause_requires_source() {
        let (mut session, _) = session();
        session.toggle_pause();
        assert!(!session.is_playing());

        session.play(vec![song("A")], 0);
        session.toggle_pause();
        assert!(!session.is_playing());
        session.toggle_pause();
        assert!(session.is_playing());
    }

    #[test]
    fn test_set_playing_keeps_previous_uri() {
        let (mut session, _) = session();
        session.set_playing(true, Some("spotify:track:a".to_string()));
        session.set_playing(false, None);
        assert!(!session.is_playing());
        assert_eq!(session.state().uri.as_deref(), Some("spotify:track:a"));

        session.set_loading(true);
        assert!(session.is_loading());
    }

    #[test]
    fn test_follow_track_moves_to_neighbours_only() {
        let (mut session, _) = session();
        session.play(vec![song("A"), song("B"), song("C")], 1);

        session.follow_track("spotify:track:b");
        assert_eq!(session.state().song_index, 1);

        session.follow_track("spotify:track:zzz");
        assert_eq!(session.state().song_index, 1);

        session.follow_track("spotify:track:c");
        assert_eq!(session.state().song_index, 2);

        session.follow_track("spotify:track:b");
        assert_eq!(session.state().song_index, 1);
    }

    fn snapshot(track: &str, is_playing: bool) -> PlayerSnapshot {
        PlayerSnapshot {
            position_ms: 0,
            duration_ms: 200_000,
            is_playing,
            track_uri: Some(format!("spotify:track:{}", track)),
        }
    }

    #[test]
    fn test_reconcile_ignores_stale_track_after_skip() {
        let (mut session, _) = session();
        session.play(vec![song("A"), song("B"), song("C")], 0);
        session.reconcile(&snapshot("a", true), Instant::now());

        session.next_song();
        session.reconcile(&snapshot("a", true), Instant::now());
        assert_eq!(session.state().song_index, 1);
        assert_eq!(session.state().source, Some(song("B")));

        // Once confirmed, external changes are followed again
        session.reconcile(&snapshot("b", true), Instant::now());
        session.reconcile(&snapshot("c", true), Instant::now());
        assert_eq!(session.state().song_index, 2);
    }

    #[test]
    fn test_reconcile_ignores_stale_play_state_after_pause() {
        let (mut session, _) = session();
        session.play(vec![song("A")], 0);
        session.reconcile(&snapshot("a", true), Instant::now());

        session.toggle_pause();
        session.reconcile(&snapshot("a", true), Instant::now());
        assert!(!session.is_playing());

        session.reconcile(&snapshot("a", false), Instant::now());
        session.reconcile(&snapshot("a", true), Instant::now());
        assert!(session.is_playing());
    }

    #[test]
    fn test_reconcile_follows_player_after_timeout() {
        let (mut session, _) = session();
        session.play(vec![song("A"), song("B")], 0);
        session.next_song();

        let later = Instant::now() + PENDING_TIMEOUT;
        session.reconcile(&snapshot("a", false), later);
        assert!(!session.is_playing());
        assert_eq!(session.state().uri.as_deref(), Some("spotify:track:a"));
        assert_eq!(session.state().song_index, 0);
    }

    #[test]
    fn test_reconcile_without_source_is_no_op() {
        let (mut session, _) = session();
        session.reconcile(&snapshot("a", true), Instant::now());
        assert_eq!(*session.state(), AudioState::default());
    }
}
