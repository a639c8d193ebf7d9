mod audio;
mod auth;
mod config;
mod controller;
mod logging;
mod model;
mod view;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use rspotify::{clients::OAuthClient, AuthCodeSpotify, Token};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};

use audio::AudioBackend;
use config::Config;
use controller::AppController;
use model::{AppModel, SpotifyClient, SpotifyEngine};
use view::{AppView, TerminalTitle};

const TOKEN_CHECK_INTERVAL: Duration = Duration::from_secs(60);
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Failed to load config, using defaults: {}", e);
            Config::default()
        }
    };

    if let Err(e) = logging::init_logging(&config.logging) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== ClickWheel Starting ===");

    // Step 1: Get credentials
    let auth_result = auth::perform_oauth_flow(&config.spotify).await?;

    // Step 2: Authenticate with rspotify
    let rspotify_client = setup_rspotify(auth_result.rspotify_token.clone()).await?;

    match rspotify_client.me().await {
        Ok(user) => tracing::info!(user_id = %user.id, "rspotify authorized successfully"),
        Err(e) => {
            tracing::error!(error = %e, "rspotify authentication failed");
            return Err(anyhow::anyhow!("rspotify init failed"));
        }
    }

    let device_name = config.spotify.device_name.clone();
    let spotify_client = SpotifyClient::new(
        rspotify_client,
        Some(device_name.clone()),
        auth_result.refresh_token.clone(),
        auth_result.rspotify_token.expires_at,
    );

    let (error_tx, mut error_rx) = mpsc::unbounded_channel();
    let engine =
        SpotifyEngine::spawn(spotify_client.clone(), config.sync.poll_interval(), error_tx);

    let mut app_model = AppModel::new(Box::new(TerminalTitle), config.wheel.step);
    app_model.set_spotify_client(spotify_client);
    app_model.update_device_name(device_name.clone());

    let model = Arc::new(Mutex::new(app_model));
    let controller = AppController::new(model.clone(), Arc::new(engine));

    // Initialize audio backend in background; it must outlive the UI loop
    let audio_backend: Arc<Mutex<Option<AudioBackend>>> = Arc::new(Mutex::new(None));
    let audio_backend_init = audio_backend.clone();
    let controller_for_audio = controller.clone();
    tokio::spawn(async move {
        match AudioBackend::new(auth_result, &device_name).await {
            Ok(backend) => {
                tracing::info!(user = %backend.username(), "Librespot session ready");
                controller_for_audio.start_player_event_listener(backend.player_event_channel());
                *audio_backend_init.lock().await = Some(backend);
            }
            Err(e) => {
                tracing::error!(error = %e, "Audio backend failed to start");
                let mut model = controller_for_audio.model.lock().await;
                model.set_error(format!("Audio init failed: {}", e));
            }
        }
    });

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &controller, &config, &mut error_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    drop(audio_backend);
    tracing::info!("ClickWheel shutting down");
    Ok(())
}

async fn setup_rspotify(access_token: Token) -> Result<AuthCodeSpotify> {
    let spotify = AuthCodeSpotify::with_config(
        Default::default(),
        Default::default(),
        rspotify::Config {
            token_cached: false,
            token_refreshing: false,
            ..Default::default()
        },
    );

    tracing::debug!("rspotify client initialized");

    *spotify
        .token
        .lock()
        .await
        .map_err(|_| anyhow::anyhow!("Token lock poisoned"))? = Some(access_token);
    tracing::debug!("rspotify token set");
    Ok(spotify)
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &AppController,
    config: &Config,
    errors: &mut mpsc::UnboundedReceiver<anyhow::Error>,
) -> io::Result<()> {
    let refresh_interval = config.sync.refresh_interval();
    let mut last_token_check = Instant::now();
    // Force a refresh on the first pass
    let mut last_refresh: Option<Instant> = None;
    let mut area = Rect::default();

    loop {
        // Periodically check and refresh token if needed
        if last_token_check.elapsed() >= TOKEN_CHECK_INTERVAL {
            last_token_check = Instant::now();
            let controller = controller.clone();
            let client_id = config.spotify.client_id.clone();
            let redirect_uri = config.spotify.redirect_uri.clone();
            tokio::spawn(async move {
                controller.check_token_refresh(&client_id, &redirect_uri).await;
            });
        }

        if last_refresh.is_none_or(|at| at.elapsed() >= refresh_interval) {
            last_refresh = Some(Instant::now());
            controller.tick().await;
        }

        controller.report_errors(errors).await;

        let should_quit = {
            let mut model = controller.model.lock().await;

            // Auto-clear old errors (after 5 seconds)
            model.auto_clear_old_errors();

            let completed = terminal.draw(|f| {
                AppView::render(f, &model);
            })?;
            area = completed.area;

            model.should_quit()
        };

        if should_quit {
            break;
        }

        // Handle input with shorter poll time for smoother UI updates
        if event::poll(INPUT_POLL_INTERVAL)? {
            let result = match event::read()? {
                Event::Key(key) => controller.handle_key_event(key).await,
                Event::Mouse(mouse) => controller.handle_mouse_event(mouse, area).await,
                _ => Ok(()),
            };
            if let Err(e) = result {
                tracing::warn!(error = %e, "Input handling failed");
            }
        }
    }

    Ok(())
}
