//! Periodic sync with the external player, token upkeep and error reporting

use tokio::sync::mpsc;

use super::AppController;

impl AppController {
    /// Reconcile the session and any mounted scrubber with the latest
    /// polled player state
    pub async fn tick(&self) {
        let snapshot = self.engine.snapshot();
        let mut model = self.model.lock().await;
        model.tick(snapshot.as_ref());
    }

    /// Move failures reported by background commands into the error banner
    pub async fn report_errors(&self, errors: &mut mpsc::UnboundedReceiver<anyhow::Error>) {
        let mut latest = None;
        while let Ok(error) = errors.try_recv() {
            latest = Some(error);
        }

        if let Some(error) = latest {
            let mut model = self.model.lock().await;
            model.set_error(Self::format_error(&error));
        }
    }

    pub async fn check_token_refresh(&self, client_id: &str, redirect_uri: &str) {
        let spotify = {
            let model = self.model.lock().await;
            model.get_spotify_client()
        };
        let Some(spotify) = spotify else {
            return;
        };

        match spotify.refresh_token_if_needed(client_id, redirect_uri).await {
            Ok(true) => tracing::debug!("Access token refreshed"),
            Ok(false) => {}
            Err(e) => {
                tracing::error!(error = %e, "Failed to refresh access token");
                let mut model = self.model.lock().await;
                model.set_error(Self::format_error(&e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use tokio::sync::Mutex;

    use super::*;
    use crate::model::testing::{song, MockEngine, RecordingTitle};
    use crate::model::AppModel;

    fn controller(engine: MockEngine) -> AppController {
        let model = AppModel::new(Box::new(RecordingTitle::default()), 5);
        AppController::new(Arc::new(Mutex::new(model)), Arc::new(engine))
    }

    #[tokio::test]
    async fn test_tick_updates_now_playing() {
        let engine = MockEngine::with_snapshot(5_000, 60_000, true);
        let controller = controller(engine);
        {
            let mut model = controller.model.lock().await;
            model.session_mut().play(vec![song("A")], 0);
            model.open_now_playing(None);
        }

        controller.tick().await;

        let model = controller.model.lock().await;
        let sync = model.now_playing_sync().map(|s| (s.current_time(), s.max_time()));
        assert_eq!(sync, Some((5, 60)));
    }

    #[tokio::test]
    async fn test_report_errors_shows_latest() {
        let controller = controller(MockEngine::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(anyhow::anyhow!("first")).unwrap();
        tx.send(anyhow::anyhow!("second")).unwrap();

        controller.report_errors(&mut rx).await;

        let model = controller.model.lock().await;
        assert_eq!(model.error_message(), Some("Error: second"));
    }
}
