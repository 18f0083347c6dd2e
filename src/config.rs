//! Configuration for monthlify.
//!
//! Secrets come from the process environment, optionally seeded from a `.env`
//! file. Everything else is a compile-time constant: the tool runs once with a
//! fixed redirect URI, callback port, lookback window and OAuth state value.
//!
//! Lookup order for `.env` files:
//! 1. Variables already present in the environment (never overwritten)
//! 2. `.env` in the current working directory
//! 3. `.env` in the local data directory under `monthlify/.env`

use std::{env, path::PathBuf, time::Duration};

use crate::error::{AppError, Result};

/// Address the one-shot callback server binds to.
pub const SERVER_ADDRESS: &str = "127.0.0.1:8080";

/// Redirect URI registered with the Spotify application. Must point at
/// [`SERVER_ADDRESS`].
pub const REDIRECT_URI: &str = "http://localhost:8080/callback";

/// How long a finished login waits for the callback server to deliver its
/// last response.
pub const CALLBACK_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Anti-CSRF `state` value sent with the authorization request.
pub const OAUTH_STATE: &str = "abc123";

/// Credential cache, relative to the working directory.
pub const TOKEN_FILE: &str = ".spotify-token";

/// Liked tracks older than this many months stop the fetch.
pub const LOOKBACK_MONTHS: u32 = 13;

pub const PLAYLISTS_PAGE_SIZE: u32 = 10;
pub const PLAYLIST_TRACKS_PAGE_SIZE: u32 = 10;
pub const LIKED_TRACKS_PAGE_SIZE: u32 = 50;

/// Upper bound on pages requested by a single paginated fetch.
pub const MAX_PAGES: usize = 10_000;

pub const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

pub const SPOTIFY_SCOPES: &[&str] = &[
    "user-read-private",
    "playlist-read-private",
    "playlist-read-collaborative",
    "user-library-read",
    "playlist-modify-public",
    "playlist-modify-private",
];

pub const ENV_CLIENT_ID: &str = "SPOTIFY_ID";
pub const ENV_CLIENT_SECRET: &str = "SPOTIFY_SECRET";

/// Loads `.env` files into the process environment.
///
/// Missing files are not an error; a present but malformed file is.
pub fn load_env() -> Result<()> {
    match dotenv::dotenv() {
        Ok(_) => {}
        Err(e) if e.not_found() => {}
        Err(e) => return Err(AppError::Config(e.to_string())),
    }

    let path = env_file_path();
    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| AppError::Config(e.to_string()))?;
        tracing::debug!("Loaded environment from {}", path.display());
    }

    Ok(())
}

/// Location of the per-user `.env` file.
pub fn env_file_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("monthlify/.env");
    path
}

/// Client credentials of the registered Spotify application.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
}

impl Config {
    /// Reads the client credentials from the environment.
    ///
    /// Call [`load_env`] first so `.env` files are taken into account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] naming the first of [`ENV_CLIENT_ID`] and
    /// [`ENV_CLIENT_SECRET`] that is unset or blank.
    pub fn from_env() -> Result<Self> {
        let client_id = required_var(ENV_CLIENT_ID)?;
        let client_secret = required_var(ENV_CLIENT_SECRET)?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Config(format!("{} must be set", name))),
    }
}
