use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use anyhow::{Context, Result};
use std::collections::HashSet;

use rspotify::Token;
use librespot::core::{authentication::Credentials, cache::Cache};

use crate::config::SpotifyConfig;

pub const SCOPES: &str =
    "streaming user-read-playback-state user-modify-playback-state user-read-currently-playing playlist-read-private playlist-read-collaborative user-read-playback-position user-library-read";

const RESPONSE: &str = r#"
<!doctype html>
<html>
<head><title>Success</title></head>
<body><h1>ClickWheel is connected!</h1><script>window.close();</script></body>
</html>
"#;
const REFRESH_TOKEN_FILE: &str = "refresh_token";
const TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Clone)]
pub struct AuthResult {
    pub librespot_credentials: Credentials,
    pub rspotify_token: Token,
    pub refresh_token: String,
    pub cache: Cache,
}

/// Result of exchanging a refresh token
pub struct RefreshedToken {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

fn refresh_token_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(REFRESH_TOKEN_FILE)
}

fn oauth_client(client_id: &str, redirect_uri: &str) -> Result<librespot_oauth::OAuthClient> {
    librespot_oauth::OAuthClientBuilder::new(
        client_id,
        redirect_uri,
        SCOPES.split_whitespace().collect(),
    )
    .build()
    .context("Failed to build OAuth client")
}

async fn perform_browser_auth(config: &SpotifyConfig) -> Result<(Credentials, String, String)> {
    tracing::info!("Starting browser-based OAuth flow");
    let client = librespot_oauth::OAuthClientBuilder::new(
        &config.client_id,
        &config.redirect_uri,
        SCOPES.split_whitespace().collect(),
    )
    .open_in_browser()
    .with_custom_message(RESPONSE)
    .build()
    .context("Failed to build OAuth client")?;

    let token = client
        .get_access_token_async()
        .await
        .context("Failed to get token")?;

    if let Err(e) = fs::write(refresh_token_path(&config.cache_dir), &token.refresh_token) {
        tracing::warn!(error = %e, "Could not save refresh token");
    } else {
        tracing::debug!("Saved refresh token to disk");
    }

    let credentials = Credentials::with_access_token(token.access_token.clone());
    tracing::info!("Browser authentication completed successfully");
    Ok((credentials, token.access_token, token.refresh_token))
}

pub async fn refresh_access_token(
    client_id: &str,
    redirect_uri: &str,
    refresh_token: &str,
) -> Result<RefreshedToken> {
    let token = oauth_client(client_id, redirect_uri)?
        .refresh_token_async(refresh_token)
        .await
        .context("Failed to refresh access token")?;

    Ok(RefreshedToken {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at: Utc::now() + chrono::Duration::seconds(TOKEN_LIFETIME_SECS),
    })
}

pub async fn perform_oauth_flow(config: &SpotifyConfig) -> Result<AuthResult> {
    fs::create_dir_all(&config.cache_dir)?;
    let cache_dir = config.cache_dir.as_path();
    let files_dir = cache_dir.join("files");
    let cache = Cache::new(Some(cache_dir), Some(cache_dir), Some(files_dir.as_path()), None)?;

    let stored_refresh_token = fs::read_to_string(refresh_token_path(cache_dir)).ok();

    let (credentials, access_token, refresh_token) =
        if let (Some(creds), Some(refresh_token)) = (cache.credentials(), stored_refresh_token) {
            tracing::info!("Found cached Librespot credentials and refresh token");

            let refreshed =
                refresh_access_token(&config.client_id, &config.redirect_uri, refresh_token.trim())
                    .await;
            match refreshed {
                Ok(refreshed) => {
                    let _ = fs::write(refresh_token_path(cache_dir), &refreshed.refresh_token);
                    tracing::debug!("Token refreshed successfully");
                    (creds, refreshed.access_token, refreshed.refresh_token)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Cached refresh token failed, re-authenticating");
                    perform_browser_auth(config).await?
                }
            }
        } else {
            tracing::info!("No cached credentials found, starting browser authentication");
            perform_browser_auth(config).await?
        };

    Ok(AuthResult {
        librespot_credentials: credentials,
        rspotify_token: Token {
            access_token,
            expires_in: chrono::Duration::seconds(TOKEN_LIFETIME_SECS),
            expires_at: Some(Utc::now() + chrono::Duration::seconds(TOKEN_LIFETIME_SECS)),
            scopes: SCOPES
                .split_whitespace()
                .map(|s| s.to_string())
                .collect::<HashSet<String>>(),
            refresh_token: None,
        },
        refresh_token,
        cache,
    })
}
