use async_trait::async_trait;
use error_stack::{IntoReport, Report, ResultExt};
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::BearerToken;
use crate::config::AppConfig;
use crate::spotify::{
    Catalog, NewPlaylist, PlaylistRef, SearchCandidate, SpotifyError, SpotifyResult, TrackPage,
    TrackPageRequest,
};

#[derive(Serialize, Deserialize, Clone, Debug)]
struct ApiArtist {
    name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct ApiAlbum {
    id: String,
    name: String,
    uri: String,
    #[serde(default)]
    artists: Vec<ApiArtist>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct ApiAlbumPage {
    items: Vec<Option<ApiAlbum>>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct SearchResponse {
    albums: ApiAlbumPage,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct ApiTrack {
    id: Option<String>,
    name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct AlbumTracks {
    items: Vec<ApiTrack>,
    next: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct CurrentUser {
    id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct ExternalUrls {
    spotify: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct ApiPlaylist {
    id: String,
    external_urls: ExternalUrls,
}

/// `Catalog` backed by the Spotify Web API, authorized with one bearer token
/// for the whole run.
pub struct SpotifyApi {
    client: Client,
    base_url: String,
    token: BearerToken,
}

impl SpotifyApi {
    pub fn new(token: BearerToken) -> Self {
        Self::with_base_url(token, AppConfig::SPOTIFY_API_BASE.to_string())
    }

    pub fn with_base_url(token: BearerToken, base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> SpotifyResult<String> {
        let response = request
            .bearer_auth(self.token.secret())
            .send()
            .await
            .into_report()
            .change_context(SpotifyError)
            .attach_printable(format!("Request failed: {}", what))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .into_report()
            .change_context(SpotifyError)
            .attach_printable(format!("Failed to read response body: {}", what))?;
        if !status.is_success() {
            return Err(Report::new(SpotifyError)
                .attach_printable(format!("{} returned {}", what, status))
                .attach_printable(body));
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> SpotifyResult<T> {
        let body = self.send(request, what).await?;
        serde_json::from_str::<T>(&body)
            .into_report()
            .change_context(SpotifyError)
            .attach_printable(format!("Unexpected response shape: {}", what))
    }
}

#[async_trait]
impl Catalog for SpotifyApi {
    async fn search_albums(
        &self,
        query: &str,
        limit: usize,
    ) -> SpotifyResult<Vec<SearchCandidate>> {
        debug!("search albums: {:?} (limit {})", query, limit);
        let limit = limit.to_string();
        let request = self.client.get(self.endpoint("/search")).query(&[
            ("q", query),
            ("type", "album"),
            ("limit", limit.as_str()),
        ]);
        let response: SearchResponse = self
            .send_json(request, &format!("GET /search q={}", query))
            .await?;
        let candidates = response
            .albums
            .items
            .into_iter()
            .flatten()
            .map(|album| SearchCandidate {
                artist_name: album
                    .artists
                    .first()
                    .map(|artist| artist.name.clone())
                    .unwrap_or_default(),
                id: album.id,
                name: album.name,
                uri: album.uri,
            })
            .collect();
        Ok(candidates)
    }

    async fn album_tracks(&self, request: &TrackPageRequest) -> SpotifyResult<TrackPage> {
        let url = match request {
            TrackPageRequest::First { album_id, limit } => {
                let path = format!("/albums/{}/tracks?limit={}", album_id, limit);
                self.endpoint(&path)
            }
            TrackPageRequest::Next(url) => url.clone(),
        };
        debug!("album tracks page: {}", url);
        let page: AlbumTracks = self
            .send_json(self.client.get(&url), &format!("GET {}", url))
            .await?;
        let mut track_ids = Vec::with_capacity(page.items.len());
        for track in page.items {
            match track.id {
                Some(id) => track_ids.push(id),
                None => debug!("skipping track {:?} without an id", track.name),
            }
        }
        Ok(TrackPage {
            track_ids,
            next: page.next,
        })
    }

    async fn current_user_id(&self) -> SpotifyResult<String> {
        let user: CurrentUser = self
            .send_json(self.client.get(self.endpoint("/me")), "GET /me")
            .await?;
        Ok(user.id)
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> SpotifyResult<PlaylistRef> {
        let path = format!("/users/{}/playlists", user_id);
        let request = self.client.post(self.endpoint(&path)).json(playlist);
        let created: ApiPlaylist = self
            .send_json(request, &format!("POST {}", path))
            .await?;
        Ok(PlaylistRef {
            id: created.id,
            url: created.external_urls.spotify,
        })
    }

    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> SpotifyResult<()> {
        let path = format!("/playlists/{}/tracks", playlist_id);
        let uris = track_ids
            .iter()
            .map(|id| format!("spotify:track:{}", id))
            .collect::<Vec<_>>();
        debug!("adding {} tracks to playlist {}", uris.len(), playlist_id);
        let request = self
            .client
            .post(self.endpoint(&path))
            .json(&json!({ "uris": uris }));
        self.send(request, &format!("POST {}", path)).await?;
        Ok(())
    }
}
