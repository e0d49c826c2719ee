use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use error_stack::Report;

use crate::spotify::{
    Catalog, NewPlaylist, PlaylistRef, SearchCandidate, SpotifyError, SpotifyResult, TrackPage,
    TrackPageRequest,
};

/// Every call the fake received, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FakeCall {
    Search(String),
    TracksPage(TrackPageRequest),
    CurrentUser,
    CreatePlaylist(NewPlaylist),
    AddTracks { playlist_id: String, count: usize },
}

/// In-memory catalog: search results are keyed by exact query text, album
/// tracks are paged with fake `next` URLs.
#[derive(Default)]
pub struct FakeCatalog {
    searches: HashMap<String, Vec<SearchCandidate>>,
    albums: HashMap<String, Vec<String>>,
    failing_searches: Vec<String>,
    fail_add_on_call: Option<usize>,
    calls: Mutex<Vec<FakeCall>>,
    added: Mutex<Vec<Vec<String>>>,
}

pub fn candidate(id: &str, name: &str, artist: &str) -> SearchCandidate {
    SearchCandidate {
        id: id.to_string(),
        name: name.to_string(),
        artist_name: artist.to_string(),
        uri: format!("spotify:album:{}", id),
    }
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: &str, results: Vec<SearchCandidate>) -> Self {
        self.searches.insert(query.to_string(), results);
        self
    }

    pub fn with_album(mut self, album_id: &str, track_count: usize) -> Self {
        let tracks = (0..track_count)
            .map(|n| format!("{}-t{}", album_id, n))
            .collect();
        self.albums.insert(album_id.to_string(), tracks);
        self
    }

    pub fn failing_search(mut self, query: &str) -> Self {
        self.failing_searches.push(query.to_string());
        self
    }

    /// Make the n-th (0-based) `add_tracks` call fail.
    pub fn failing_add(mut self, call_index: usize) -> Self {
        self.fail_add_on_call = Some(call_index);
        self
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                FakeCall::Search(query) => Some(query),
                _ => None,
            })
            .collect()
    }

    pub fn added_batches(&self) -> Vec<Vec<String>> {
        self.added.lock().unwrap().clone()
    }

    fn record(&self, call: FakeCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn page_of(&self, album_id: &str, offset: usize, limit: usize) -> SpotifyResult<TrackPage> {
        let tracks = self.albums.get(album_id).ok_or_else(|| {
            Report::new(SpotifyError).attach_printable(format!("unknown album {}", album_id))
        })?;
        let end = (offset + limit).min(tracks.len());
        let next = (end < tracks.len())
            .then(|| format!("fake://albums/{}/tracks?offset={}&limit={}", album_id, end, limit));
        Ok(TrackPage {
            track_ids: tracks[offset.min(end)..end].to_vec(),
            next,
        })
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn search_albums(
        &self,
        query: &str,
        limit: usize,
    ) -> SpotifyResult<Vec<SearchCandidate>> {
        self.record(FakeCall::Search(query.to_string()));
        if self.failing_searches.iter().any(|failing| failing == query) {
            return Err(Report::new(SpotifyError).attach_printable("search returned 503"));
        }
        let mut results = self.searches.get(query).cloned().unwrap_or_default();
        results.truncate(limit);
        Ok(results)
    }

    async fn album_tracks(&self, request: &TrackPageRequest) -> SpotifyResult<TrackPage> {
        self.record(FakeCall::TracksPage(request.clone()));
        match request {
            TrackPageRequest::First { album_id, limit } => self.page_of(album_id, 0, *limit),
            TrackPageRequest::Next(url) => {
                let rest = url.trim_start_matches("fake://albums/");
                let (album_id, query) = rest.split_once("/tracks?").ok_or_else(|| {
                    Report::new(SpotifyError).attach_printable(format!("bad next url {}", url))
                })?;
                let mut offset = 0;
                let mut limit = 0;
                for pair in query.split('&') {
                    match pair.split_once('=') {
                        Some(("offset", value)) => offset = value.parse().unwrap_or(0),
                        Some(("limit", value)) => limit = value.parse().unwrap_or(0),
                        _ => {}
                    }
                }
                self.page_of(album_id, offset, limit)
            }
        }
    }

    async fn current_user_id(&self) -> SpotifyResult<String> {
        self.record(FakeCall::CurrentUser);
        Ok("fake-user".to_string())
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> SpotifyResult<PlaylistRef> {
        self.record(FakeCall::CreatePlaylist(playlist.clone()));
        Ok(PlaylistRef {
            id: format!("{}-playlist", user_id),
            url: format!("https://open.spotify.com/playlist/{}-playlist", user_id),
        })
    }

    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> SpotifyResult<()> {
        let call_index = self
            .calls()
            .iter()
            .filter(|call| matches!(call, FakeCall::AddTracks { .. }))
            .count();
        self.record(FakeCall::AddTracks {
            playlist_id: playlist_id.to_string(),
            count: track_ids.len(),
        });
        if self.fail_add_on_call == Some(call_index) {
            return Err(Report::new(SpotifyError).attach_printable("add tracks returned 500"));
        }
        self.added.lock().unwrap().push(track_ids.to_vec());
        Ok(())
    }
}
