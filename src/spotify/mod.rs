use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod api;
#[cfg(test)]
pub mod fake;

#[derive(Debug)]
pub struct SpotifyError;

impl fmt::Display for SpotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Spotify error")
    }
}

impl std::error::Error for SpotifyError {}

pub type SpotifyResult<T> = error_stack::Result<T, SpotifyError>;

/// An album returned by catalog search.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SearchCandidate {
    pub id: String,
    pub name: String,
    /// Name of the first credited artist.
    pub artist_name: String,
    pub uri: String,
}

impl SearchCandidate {
    pub fn url(&self) -> String {
        format!("https://open.spotify.com/album/{}", self.id)
    }
}

/// Which page of an album's tracks to fetch next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackPageRequest {
    First { album_id: String, limit: usize },
    /// Absolute URL handed back by the previous page.
    Next(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackPage {
    pub track_ids: Vec<String>,
    pub next: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct NewPlaylist {
    pub name: String,
    pub public: bool,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistRef {
    pub id: String,
    pub url: String,
}

/// The slice of the Spotify Web API the playlist builder talks to.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn search_albums(&self, query: &str, limit: usize)
        -> SpotifyResult<Vec<SearchCandidate>>;

    async fn album_tracks(&self, request: &TrackPageRequest) -> SpotifyResult<TrackPage>;

    async fn current_user_id(&self) -> SpotifyResult<String>;

    async fn create_playlist(
        &self,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> SpotifyResult<PlaylistRef>;

    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> SpotifyResult<()>;
}
