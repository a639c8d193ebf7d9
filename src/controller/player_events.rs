//! Player event listener for librespot playback events

use librespot::playback::player::{PlayerEvent, PlayerEventChannel};

use super::AppController;

/// Loading flag implied by a librespot event, if the event says anything
/// about it
pub(crate) fn loading_from_event(event: &PlayerEvent) -> Option<bool> {
    match event {
        PlayerEvent::Loading { .. } => Some(true),
        PlayerEvent::Playing { .. }
        | PlayerEvent::Paused { .. }
        | PlayerEvent::Stopped { .. } => Some(false),
        _ => None,
    }
}

impl AppController {
    pub fn start_player_event_listener(&self, mut event_channel: PlayerEventChannel) {
        let model = self.model.clone();
        tracing::info!("Starting librespot player event listener");

        tokio::spawn(async move {
            while let Some(event) = event_channel.recv().await {
                let mut model_guard = model.lock().await;

                if model_guard.should_quit() {
                    tracing::debug!("Player event listener shutting down");
                    break;
                }

                match loading_from_event(&event) {
                    Some(loading) => {
                        tracing::debug!(loading, "PlayerEvent changed loading state");
                        model_guard.session_mut().set_loading(loading);
                    }
                    None => match event {
                        PlayerEvent::TrackChanged { audio_item } => {
                            tracing::info!(
                                track = %audio_item.name,
                                duration_ms = audio_item.duration_ms,
                                "PlayerEvent::TrackChanged"
                            );
                        }
                        PlayerEvent::EndOfTrack { .. } => {
                            tracing::debug!("PlayerEvent::EndOfTrack");
                        }
                        _ => {
                            tracing::trace!("PlayerEvent: other event received");
                        }
                    },
                }
            }
        });
    }
}
