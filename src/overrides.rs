use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};

/// User-pinned album ids, keyed by the exact `"Artist - Album"` text.
///
/// Loaded once per run and never written back; the file is edited by hand.
#[derive(Debug, Clone, Default)]
pub struct OverrideMap {
    pinned: HashMap<String, String>,
}

impl OverrideMap {
    pub fn new(pinned: HashMap<String, String>) -> Self {
        Self { pinned }
    }

    /// Reads the override file. An absent or unreadable file yields an empty
    /// map: a broken override file must not stop the run.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!("no override file at {}", path.display());
            return Self::default();
        }
        let parsed = fs::read_to_string(path)
            .map_err(|err| err.to_string())
            .and_then(|content| {
                serde_json::from_str::<HashMap<String, String>>(&content)
                    .map_err(|err| err.to_string())
            });
        match parsed {
            Ok(pinned) => {
                debug!("loaded {} overrides from {}", pinned.len(), path.display());
                Self::new(pinned)
            }
            Err(err) => {
                warn!("ignoring override file {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.pinned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pinned.is_empty()
    }

    pub fn lookup(&self, artist: &str, album: &str) -> Option<String> {
        self.pinned
            .get(&Self::key(artist, album))
            .map(|raw| Self::album_id(raw))
    }

    pub fn key(artist: &str, album: &str) -> String {
        format!("{} - {}", artist.trim(), album.trim())
    }

    /// `spotify:album:<id>` becomes `<id>`; anything else is trusted as-is.
    fn album_id(raw: &str) -> String {
        let mut parts = raw.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(_scheme), Some("album"), Some(id)) => id.to_string(),
            _ => raw.to_string(),
        }
    }
}
