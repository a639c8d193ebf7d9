use crate::auth::AuthResult;
use anyhow::{Context, Result};
use librespot::connect::{ConnectConfig, Spirc};
use librespot::core::config::SessionConfig;
use librespot::core::session::Session;
use librespot::playback::config::{AudioFormat, Bitrate, PlayerConfig};
use librespot::playback::mixer::{MixerConfig, NoOpVolume};
use librespot::playback::player::{Player, PlayerEventChannel};
use librespot::playback::{audio_backend, mixer};
use std::sync::Arc;

/// Local Spotify Connect device the click wheel plays through
pub struct AudioBackend {
    player: Arc<Player>,
    session: Session,
    _spirc: Spirc,
}

impl AudioBackend {
    pub async fn new(auth: AuthResult, device_name: &str) -> Result<Self> {
        tracing::info!(device_name, "Connecting librespot device");

        let session_config = SessionConfig {
            device_id: Self::device_id(device_name),
            ..Default::default()
        };

        let player_config = PlayerConfig {
            bitrate: Bitrate::Bitrate320,
            ..Default::default()
        };
        let audio_format = AudioFormat::default();
        let connect_config = ConnectConfig {
            name: device_name.to_string(),
            ..Default::default()
        };
        let mixer_config = MixerConfig::default();
        let sink_builder = audio_backend::find(None).context("No audio backend available")?;
        let mixer_builder = mixer::find(None).context("No mixer available")?;

        let session = Session::new(session_config, Some(auth.cache));

        let mixer = mixer_builder(mixer_config)?;

        let player = Player::new(
            player_config,
            session.clone(),
            Box::new(NoOpVolume),
            move || sink_builder(None, audio_format),
        );

        let (spirc, spirc_task) = Spirc::new(
            connect_config,
            session.clone(),
            auth.librespot_credentials,
            player.clone(),
            mixer,
        )
        .await?;

        spirc.activate()?;

        tokio::spawn(async move {
            spirc_task.await;
            tracing::debug!("Spirc task finished");
        });

        tracing::info!(device_name, "Audio device initialized");

        Ok(Self {
            player,
            session,
            _spirc: spirc,
        })
    }

    fn device_id(device_name: &str) -> String {
        // Consistent device ID per machine
        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        format!("{}-{}", device_name, hostname)
    }

    pub fn player_event_channel(&self) -> PlayerEventChannel {
        self.player.get_player_event_channel()
    }

    pub fn username(&self) -> String {
        self.session.username()
    }
}
