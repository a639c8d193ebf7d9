//! Key and mouse handling, and routing of wheel events to the focused window

use anyhow::Result;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::model::{AppModel, HomeEntry, KeyAction, PlayerEngine, Quadrant, View, WheelEvent};
use crate::view::{self, WheelHit};
use super::navigation::LoadRequest;
use super::AppController;

/// What a center click picked in the focused view
enum Choice {
    Home(HomeEntry),
    Playlist(crate::model::PlaylistItem),
    Song {
        context_uri: String,
        songs: Vec<crate::model::Song>,
        index: usize,
        show_now_playing: bool,
    },
}

/// Apply one wheel event, plus the event it derives, to the model. Returns
/// the content the newly focused window still needs loaded.
pub(crate) fn apply_wheel_event(
    model: &mut AppModel,
    engine: &dyn PlayerEngine,
    event: WheelEvent,
) -> Option<LoadRequest> {
    tracing::debug!(event = ?event, focused = ?model.windows().focused_id(), "Wheel event");
    let request = apply_single(model, engine, event);
    match event.derived() {
        Some(derived) => apply_single(model, engine, derived).or(request),
        None => request,
    }
}

fn apply_single(
    model: &mut AppModel,
    engine: &dyn PlayerEngine,
    event: WheelEvent,
) -> Option<LoadRequest> {
    match event {
        WheelEvent::ForwardScroll | WheelEvent::BackwardScroll => {
            let forward = event == WheelEvent::ForwardScroll;
            match model.focused_view_mut() {
                Some(View::NowPlaying { sync }) => {
                    if forward {
                        sync.scrub_forward(engine);
                    } else {
                        sync.scrub_backward(engine);
                    }
                }
                Some(view) => view.move_selection(forward),
                None => {}
            }
            None
        }
        WheelEvent::CenterClick => center_click(model, engine),
        WheelEvent::WheelClick(quadrant) => {
            match quadrant {
                // The menu action arrives as the derived MenuClick
                Quadrant::Top => {}
                Quadrant::Bottom => toggle_playback(model, engine),
                Quadrant::Left => {
                    engine.skip_previous();
                    model.session_mut().prev_song();
                }
                Quadrant::Right => {
                    engine.skip_next();
                    model.session_mut().next_song();
                }
            }
            None
        }
        WheelEvent::MenuClick => {
            model.close_focused();
            None
        }
    }
}

/// Pause or resume. The session's own flag decides the direction while it
/// has a source, since the polled snapshot may predate the last command.
pub(crate) fn toggle_playback(model: &mut AppModel, engine: &dyn PlayerEngine) {
    let session = model.session_mut();
    let resume = if session.source().is_some() {
        !session.is_playing()
    } else {
        !engine.snapshot().is_some_and(|s| s.is_playing)
    };
    session.toggle_pause();
    engine.toggle_playback(resume);
}

fn center_click(model: &mut AppModel, engine: &dyn PlayerEngine) -> Option<LoadRequest> {
    let choice = match model.focused_view_mut()? {
        View::Home { selection } => Choice::Home(*HomeEntry::ALL.get(selection.index)?),
        View::Playlists { items, selection, .. } => {
            Choice::Playlist(items.get(selection.index)?.clone())
        }
        View::Tracks { list, selection, .. } => {
            let list = list.as_ref()?;
            if selection.index >= list.songs.len() {
                return None;
            }
            Choice::Song {
                context_uri: list.context_uri.clone(),
                songs: list.songs.clone(),
                index: selection.index,
                show_now_playing: true,
            }
        }
        View::CoverFlow { albums, selection, .. } => {
            let album = albums.get(selection.index)?;
            if album.songs.is_empty() {
                return None;
            }
            Choice::Song {
                context_uri: album.uri.clone(),
                songs: album.songs.clone(),
                index: 0,
                show_now_playing: false,
            }
        }
        View::NowPlaying { sync } => {
            sync.toggle_mode();
            return None;
        }
    };

    match choice {
        Choice::Home(HomeEntry::Playlists) => {
            let (window, view) = View::playlists();
            model.open_window(window, view);
            Some(LoadRequest::Playlists)
        }
        Choice::Home(HomeEntry::CoverFlow) => {
            let (window, view) = View::cover_flow();
            model.open_window(window, view);
            Some(LoadRequest::SavedAlbums)
        }
        Choice::Home(HomeEntry::NowPlaying) => {
            model.open_now_playing(engine.snapshot().as_ref());
            None
        }
        Choice::Playlist(playlist) => {
            let (window, view) = View::tracks(playlist.clone());
            model.open_window(window, view);
            Some(LoadRequest::PlaylistTracks(playlist))
        }
        Choice::Song { context_uri, songs, index, show_now_playing } => {
            if let Some(song) = songs.get(index) {
                engine.start(&context_uri, song);
            }
            model.session_mut().play(songs, index);
            if show_now_playing {
                model.open_now_playing(engine.snapshot().as_ref());
            }
            None
        }
    }
}

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        // Only handle key press events, not release or repeat
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let mut model = self.model.lock().await;

        // Handle error message first (blocks all other interactions)
        if model.error_message().is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                model.clear_error();
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true);
                return Ok(());
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                model.set_should_quit(true);
                return Ok(());
            }
            _ => {}
        }

        match KeyAction::from_key(key.code) {
            Some(KeyAction::Wheel(event)) => {
                drop(model);
                self.handle_wheel_event(event).await;
            }
            Some(KeyAction::TogglePlayback) => toggle_playback(&mut model, self.engine.as_ref()),
            None => {}
        }
        Ok(())
    }

    /// Mouse input acts on the drawn wheel: the scroll wheel turns the dial,
    /// dragging on the ring sets it, clicks hit the hub or a quadrant
    pub async fn handle_mouse_event(&self, mouse: MouseEvent, terminal_area: Rect) -> Result<()> {
        let geometry = view::wheel_geometry(terminal_area);
        let hit = geometry.hit(mouse.column, mouse.row);

        let mut model = self.model.lock().await;
        if model.error_message().is_some() {
            return Ok(());
        }

        let event = match (mouse.kind, hit) {
            (MouseEventKind::ScrollDown, Some(_)) => model.wheel_mut().turn(true),
            (MouseEventKind::ScrollUp, Some(_)) => model.wheel_mut().turn(false),
            (MouseEventKind::Down(MouseButton::Left), Some(WheelHit::Center)) => {
                Some(WheelEvent::CenterClick)
            }
            (MouseEventKind::Down(MouseButton::Left), Some(WheelHit::Ring { angle })) => {
                model.wheel_mut().touch_angle(angle);
                model.wheel().decode_click(angle)
            }
            (MouseEventKind::Drag(MouseButton::Left), Some(WheelHit::Ring { angle })) => {
                model.wheel_mut().decode_angle(angle)
            }
            _ => None,
        };
        drop(model);

        if let Some(event) = event {
            self.handle_wheel_event(event).await;
        }
        Ok(())
    }

    pub async fn handle_wheel_event(&self, event: WheelEvent) {
        let request = {
            let mut model = self.model.lock().await;
            apply_wheel_event(&mut model, self.engine.as_ref(), event)
        };

        if let Some(request) = request {
            let controller = self.clone();
            tokio::spawn(async move {
                controller.load(request).await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::{song, EngineCall, MockEngine, RecordingTitle};
    use crate::model::{
        PlayerSnapshot, PlaylistItem, SyncMode, TrackList, COVER_FLOW_ID, HOME_ID, NOW_PLAYING_ID,
    };

    fn model() -> AppModel {
        AppModel::new(Box::new(RecordingTitle::default()), 5)
    }

    fn playlist() -> PlaylistItem {
        PlaylistItem {
            id: "mix".to_string(),
            name: "Mix".to_string(),
        }
    }

    fn focused(model: &AppModel) -> String {
        model.windows().focused_id().unwrap_or_default()
    }

    #[test]
    fn test_center_click_on_home_opens_playlists() {
        let engine = MockEngine::default();
        let mut model = model();

        let request = apply_wheel_event(&mut model, &engine, WheelEvent::CenterClick);
        assert_eq!(request, Some(LoadRequest::Playlists));
        assert_eq!(focused(&model), "playlists");
    }

    #[test]
    fn test_scroll_moves_menu_selection() {
        let engine = MockEngine::default();
        let mut model = model();

        apply_wheel_event(&mut model, &engine, WheelEvent::ForwardScroll);
        apply_wheel_event(&mut model, &engine, WheelEvent::ForwardScroll);
        let request = apply_wheel_event(&mut model, &engine, WheelEvent::CenterClick);

        // Third entry is Now Playing, which needs nothing loaded
        assert_eq!(request, None);
        assert_eq!(focused(&model), NOW_PLAYING_ID);
        assert!(model.windows().layout().menu_hidden);
    }

    #[test]
    fn test_menu_click_closes_focused_window_but_not_root() {
        let engine = MockEngine::default();
        let mut model = model();
        apply_wheel_event(&mut model, &engine, WheelEvent::CenterClick);

        apply_wheel_event(&mut model, &engine, WheelEvent::WheelClick(Quadrant::Top));
        assert_eq!(focused(&model), HOME_ID);

        apply_wheel_event(&mut model, &engine, WheelEvent::MenuClick);
        assert_eq!(focused(&model), HOME_ID);
        assert_eq!(model.windows().len(), 1);
    }

    #[test]
    fn test_selecting_a_track_plays_and_shows_now_playing() {
        let engine = MockEngine::with_snapshot(0, 180_000, true);
        let mut model = model();

        let (window, mut view) = View::tracks(playlist());
        if let View::Tracks { list, .. } = &mut view {
            *list = Some(TrackList {
                context_uri: "spotify:playlist:mix".to_string(),
                title: "Mix".to_string(),
                songs: vec![song("A"), song("B")],
            });
        }
        model.open_window(window, view);

        apply_wheel_event(&mut model, &engine, WheelEvent::ForwardScroll);
        apply_wheel_event(&mut model, &engine, WheelEvent::CenterClick);

        assert_eq!(model.session().source(), Some(&song("B")));
        assert_eq!(model.session().state().song_index, 1);
        assert_eq!(focused(&model), NOW_PLAYING_ID);
        assert_eq!(model.now_playing_sync().map(|s| s.max_time()), Some(180));
        assert_eq!(
            engine.calls(),
            vec![EngineCall::Start(
                "spotify:playlist:mix".to_string(),
                "spotify:track:b".to_string()
            )]
        );
    }

    #[test]
    fn test_now_playing_scrubs_only_in_scrub_mode() {
        let engine = MockEngine::with_snapshot(30_000, 180_000, true);
        let mut model = model();
        model.open_now_playing(engine.snapshot().as_ref());

        apply_wheel_event(&mut model, &engine, WheelEvent::ForwardScroll);
        assert!(engine.calls().is_empty());

        apply_wheel_event(&mut model, &engine, WheelEvent::CenterClick);
        assert_eq!(model.now_playing_sync().map(|s| s.mode()), Some(SyncMode::Scrubbing));

        apply_wheel_event(&mut model, &engine, WheelEvent::ForwardScroll);
        apply_wheel_event(&mut model, &engine, WheelEvent::ForwardScroll);
        apply_wheel_event(&mut model, &engine, WheelEvent::BackwardScroll);
        assert_eq!(model.now_playing_sync().map(|s| s.current_time()), Some(31));
        assert_eq!(
            engine.calls(),
            vec![EngineCall::Seek(31_000), EngineCall::Seek(32_000), EngineCall::Seek(31_000)]
        );
    }

    #[test]
    fn test_quadrant_clicks_drive_playback() {
        let engine = MockEngine::default();
        let mut model = model();
        model.session_mut().play(vec![song("A"), song("B")], 0);

        apply_wheel_event(&mut model, &engine, WheelEvent::WheelClick(Quadrant::Bottom));
        assert!(!model.session().is_playing());

        apply_wheel_event(&mut model, &engine, WheelEvent::WheelClick(Quadrant::Right));
        assert_eq!(model.session().state().song_index, 1);
        assert!(model.session().is_playing());

        apply_wheel_event(&mut model, &engine, WheelEvent::WheelClick(Quadrant::Left));
        assert_eq!(model.session().state().song_index, 0);

        assert_eq!(
            engine.calls(),
            vec![
                EngineCall::TogglePlayback(false),
                EngineCall::SkipNext,
                EngineCall::SkipPrevious
            ]
        );
    }

    fn player_on(engine: &MockEngine, track: &str, is_playing: bool) {
        *engine.snapshot.lock().unwrap() = Some(PlayerSnapshot {
            position_ms: 1_000,
            duration_ms: 180_000,
            is_playing,
            track_uri: Some(format!("spotify:track:{}", track)),
        });
    }

    #[test]
    fn test_skip_survives_snapshot_polled_before_it() {
        let engine = MockEngine::default();
        let mut model = model();
        model.session_mut().play(vec![song("A"), song("B"), song("C")], 0);
        player_on(&engine, "a", true);
        model.tick(engine.snapshot().as_ref());

        apply_wheel_event(&mut model, &engine, WheelEvent::WheelClick(Quadrant::Right));
        model.tick(engine.snapshot().as_ref());
        assert_eq!(model.session().state().song_index, 1);
        assert_eq!(model.session().source(), Some(&song("B")));

        player_on(&engine, "b", true);
        model.tick(engine.snapshot().as_ref());
        assert_eq!(model.session().state().song_index, 1);
    }

    #[test]
    fn test_repeated_toggles_alternate_despite_stale_snapshot() {
        let engine = MockEngine::default();
        let mut model = model();
        model.session_mut().play(vec![song("A")], 0);
        player_on(&engine, "a", true);

        apply_wheel_event(&mut model, &engine, WheelEvent::WheelClick(Quadrant::Bottom));
        model.tick(engine.snapshot().as_ref());
        assert!(!model.session().is_playing());

        apply_wheel_event(&mut model, &engine, WheelEvent::WheelClick(Quadrant::Bottom));
        assert!(model.session().is_playing());
        assert_eq!(
            engine.calls(),
            vec![EngineCall::TogglePlayback(false), EngineCall::TogglePlayback(true)]
        );
    }

    #[test]
    fn test_toggle_without_source_follows_player() {
        let engine = MockEngine::default();
        let mut model = model();
        player_on(&engine, "a", false);

        apply_wheel_event(&mut model, &engine, WheelEvent::WheelClick(Quadrant::Bottom));
        assert_eq!(engine.calls(), vec![EngineCall::TogglePlayback(true)]);
    }

    #[test]
    fn test_cover_flow_is_modal_and_plays_album() {
        let engine = MockEngine::default();
        let mut model = model();
        apply_wheel_event(&mut model, &engine, WheelEvent::ForwardScroll);
        let request = apply_wheel_event(&mut model, &engine, WheelEvent::CenterClick);
        assert_eq!(request, Some(LoadRequest::SavedAlbums));
        assert_eq!(focused(&model), COVER_FLOW_ID);
        assert!(model.windows().layout().all_hidden);

        let cover_flow = model.windows_mut().view_mut(COVER_FLOW_ID);
        if let Some(View::CoverFlow { albums, loading, .. }) = cover_flow {
            *loading = false;
            albums.push(crate::model::AlbumItem {
                uri: "spotify:album:x".to_string(),
                name: "X".to_string(),
                artist: "Artist".to_string(),
                songs: vec![song("A"), song("B")],
            });
        }

        apply_wheel_event(&mut model, &engine, WheelEvent::CenterClick);
        assert_eq!(model.session().source(), Some(&song("A")));
        assert_eq!(focused(&model), COVER_FLOW_ID);
        assert_eq!(
            engine.calls(),
            vec![EngineCall::Start("spotify:album:x".to_string(), "spotify:track:a".to_string())]
        );
    }
}
