//! Publishing the current song as the terminal window title

use crossterm::{execute, terminal::SetTitle};

use crate::model::{Song, TitleSink};

const IDLE_TITLE: &str = "ClickWheel";

pub fn song_title(song: Option<&Song>) -> String {
    match song {
        Some(song) if !song.artist.is_empty() => format!("{} - {}", song.name, song.artist),
        Some(song) => song.name.clone(),
        None => IDLE_TITLE.to_string(),
    }
}

pub struct TerminalTitle;

impl TitleSink for TerminalTitle {
    fn set_song_title(&self, song: Option<&Song>) {
        let title = song_title(song);
        if let Err(e) = execute!(std::io::stdout(), SetTitle(&title)) {
            tracing::warn!(error = %e, title = %title, "Failed to set terminal title");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::song;

    #[test]
    fn test_song_title() {
        let mut track = song("Intro");
        track.artist = "The xx".to_string();
        assert_eq!(song_title(Some(&track)), "Intro - The xx");

        track.artist.clear();
        assert_eq!(song_title(Some(&track)), "Intro");
        assert_eq!(song_title(None), "ClickWheel");
    }
}
