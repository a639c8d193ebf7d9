//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that turns user input into
//! wheel events, routes them to the focused window, and keeps the model in
//! step with the external player.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key and mouse handling, wheel event dispatch
//! - `navigation`: Menu content loading
//! - `playback`: Periodic sync and error reporting
//! - `player_events`: Librespot player event listener

mod input;
mod navigation;
mod playback;
mod player_events;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::model::{AppModel, PlayerEngine};


#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) engine: Arc<dyn PlayerEngine>,
}

impl AppController {
    pub fn new(model: Arc<Mutex<AppModel>>, engine: Arc<dyn PlayerEngine>) -> Self {
        Self { model, engine }
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        let error_str = error.to_string();

        // Handle common Spotify API errors
        if error_str.contains("404") {
            "No active device found. Start playing on Spotify and try again.".to_string()
        } else if error_str.contains("403") {
            "Action forbidden. Check your Spotify Premium status.".to_string()
        } else if error_str.contains("401") {
            "Authentication expired. Please restart the app.".to_string()
        } else if error_str.contains("429") {
            "Rate limited. Please wait a moment.".to_string()
        } else {
            format!("Error: {}", error_str)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_maps_status_codes() {
        let err = anyhow::anyhow!("http status: 404 Not Found");
        assert!(AppController::format_error(&err).starts_with("No active device"));

        let err = anyhow::anyhow!("status 429");
        assert_eq!(AppController::format_error(&err), "Rate limited. Please wait a moment.");

        let err = anyhow::anyhow!("socket closed");
        assert_eq!(AppController::format_error(&err), "Error: socket closed");
    }
}
