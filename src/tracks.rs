use log::debug;

use crate::config::AppConfig;
use crate::spotify::{Catalog, SpotifyResult, TrackPageRequest};

/// Collects every track id of an album in catalog order, following the
/// `next` cursor until the last page.
pub async fn expand_tracks<C: Catalog>(catalog: &C, album_id: &str) -> SpotifyResult<Vec<String>> {
    let mut track_ids = Vec::new();
    let mut request = Some(TrackPageRequest::First {
        album_id: album_id.to_string(),
        limit: AppConfig::TRACK_PAGE_SIZE,
    });
    let mut pages = 0;
    while let Some(current) = request {
        let page = catalog.album_tracks(&current).await?;
        pages += 1;
        track_ids.extend(page.track_ids);
        request = page.next.map(TrackPageRequest::Next);
    }
    debug!(
        "album {} expanded to {} tracks over {} pages",
        album_id,
        track_ids.len(),
        pages
    );
    Ok(track_ids)
}
