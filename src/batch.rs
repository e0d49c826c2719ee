use error_stack::ResultExt;

use crate::config::AppConfig;
use crate::spotify::{Catalog, SpotifyResult};

/// Adds tracks to a playlist in consecutive batches, one request at a time.
/// The first failing batch stops the rest; already inserted batches stay.
pub async fn add_tracks<C: Catalog>(
    catalog: &C,
    playlist_id: &str,
    track_ids: &[String],
) -> SpotifyResult<()> {
    let batches = track_ids.chunks(AppConfig::PLAYLIST_INSERT_BATCH);
    let total = batches.len();
    for (index, batch) in batches.enumerate() {
        catalog
            .add_tracks(playlist_id, batch)
            .await
            .attach_printable(format!(
                "Batch {} of {} failed; earlier batches remain in the playlist",
                index + 1,
                total
            ))?;
    }
    Ok(())
}
