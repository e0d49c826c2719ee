use std::fmt;

use colored::Colorize;

use crate::album_list::ListEntry;
use crate::resolver::MatchRule;
use crate::spotify::PlaylistRef;

/// Where an entry's album id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumSource {
    Override,
    Search(MatchRule),
}

impl fmt::Display for AlbumSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlbumSource::Override => f.write_str("override"),
            AlbumSource::Search(rule) => write!(f, "search, {}", rule),
        }
    }
}

/// Result of the lookup stage for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAlbum {
    pub entry_index: usize,
    pub key: String,
    pub album: Option<(String, AlbumSource)>,
}

/// Terminal state of one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Malformed,
    Unresolved,
    WouldAdd {
        album_id: String,
        source: AlbumSource,
        track_count: usize,
    },
    Added {
        album_id: String,
        source: AlbumSource,
        track_count: usize,
    },
    /// Resolved, but there was no playlist to add the tracks to.
    NoPlaylist { album_id: String },
}

impl EntryOutcome {
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            EntryOutcome::Malformed | EntryOutcome::Unresolved | EntryOutcome::NoPlaylist { .. }
        )
    }

    pub fn tracks_added(&self) -> usize {
        match self {
            EntryOutcome::Added { track_count, .. } => *track_count,
            _ => 0,
        }
    }
}

impl fmt::Display for EntryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryOutcome::Malformed => {
                write!(f, "{}", "malformed line, expected \"Artist - Album\"".red())
            }
            EntryOutcome::Unresolved => write!(f, "{}", "no album found".red()),
            EntryOutcome::WouldAdd {
                album_id,
                source,
                track_count,
            } => write!(
                f,
                "would add {} tracks from {} ({})",
                track_count.to_string().cyan(),
                album_id.yellow(),
                source
            ),
            EntryOutcome::Added {
                album_id,
                source,
                track_count,
            } => write!(
                f,
                "added {} tracks from {} ({})",
                track_count.to_string().green(),
                album_id.yellow(),
                source
            ),
            EntryOutcome::NoPlaylist { album_id } => write!(
                f,
                "{} {}",
                "no playlist to add album to:".red(),
                album_id
            ),
        }
    }
}

/// First decision for an entry: only well-formed entries are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Start {
    Malformed,
    Lookup,
}

pub fn start(entry: &ListEntry) -> Start {
    if entry.is_malformed() {
        Start::Malformed
    } else {
        Start::Lookup
    }
}

/// What happens to an album's tracks once they are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery<'a> {
    DryRun,
    Insert(&'a PlaylistRef),
    NoPlaylist,
}

pub fn delivery(dry_run: bool, playlist: Option<&PlaylistRef>) -> Delivery<'_> {
    match (dry_run, playlist) {
        (true, _) => Delivery::DryRun,
        (false, Some(playlist)) => Delivery::Insert(playlist),
        (false, None) => Delivery::NoPlaylist,
    }
}
