use std::env;
use std::fmt;

use dotenvy::dotenv;
use error_stack::{IntoReport, ResultExt};

/// `AppConfig` holds static configuration values for the application,
/// such as service endpoints and the limits the Spotify Web API imposes.
pub struct AppConfig;

impl AppConfig {
    pub const SPOTIFY_API_BASE: &'static str = "https://api.spotify.com/v1";
    pub const SPOTIFY_AUTH_URL: &'static str = "https://accounts.spotify.com/authorize";
    pub const SPOTIFY_TOKEN_URL: &'static str = "https://accounts.spotify.com/api/token";
    pub const DEFAULT_REDIRECT_URI: &'static str = "http://127.0.0.1:8888/callback";
    pub const OAUTH_SCOPES: [&'static str; 2] =
        ["playlist-modify-private", "playlist-modify-public"];
    pub const OAUTH_CALLBACK_TIMEOUT_SECS: u64 = 300;

    /// Candidates requested per album search, for both resolver stages.
    pub const SEARCH_CANDIDATE_LIMIT: usize = 10;
    /// Page size used when walking an album's tracks.
    pub const TRACK_PAGE_SIZE: usize = 50;
    /// Maximum number of tracks accepted by one playlist insertion request.
    pub const PLAYLIST_INSERT_BATCH: usize = 100;

    pub const DEFAULT_OVERRIDES_FILE: &'static str = "album_overrides.json";
    pub const DEFAULT_REPORT_FILE: &'static str = "album_misses.json";
}

#[derive(Debug)]
pub struct ConfigError;

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Config error")
    }
}

impl std::error::Error for ConfigError {}

pub type ConfigResult<T> = error_stack::Result<T, ConfigError>;

/// Spotify application credentials, read from the environment (or a `.env`
/// file in the working directory).
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
}

impl Credentials {
    pub fn from_env() -> ConfigResult<Self> {
        dotenv().ok();
        let client_id = env::var("SPOTIFY_CLIENT_ID")
            .into_report()
            .change_context(ConfigError)
            .attach_printable("SPOTIFY_CLIENT_ID environment variable not set. Please create a .env file with the credentials.")?;
        let client_secret = env::var("SPOTIFY_CLIENT_SECRET")
            .ok()
            .filter(|secret| !secret.trim().is_empty());
        let redirect_uri = env::var("SPOTIFY_REDIRECT_URI")
            .ok()
            .filter(|uri| !uri.trim().is_empty())
            .unwrap_or_else(|| AppConfig::DEFAULT_REDIRECT_URI.to_string());
        Ok(Self {
            client_id,
            client_secret,
            redirect_uri,
        })
    }
}
