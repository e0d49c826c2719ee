use std::fmt;
use std::fs;
use std::path::Path;

use error_stack::{IntoReport, Report, ResultExt};

#[derive(Debug)]
pub struct AlbumListError;

impl fmt::Display for AlbumListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Album list error")
    }
}

impl std::error::Error for AlbumListError {}

pub type AlbumListResult<T> = error_stack::Result<T, AlbumListError>;

/// One `Artist - Album` line of the input list, trimmed but otherwise as the
/// user typed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub artist: String,
    pub album: String,
    /// 1-based line number in the source file.
    pub line: usize,
}

impl ListEntry {
    pub fn new(artist: &str, album: &str, line: usize) -> Self {
        Self {
            artist: artist.trim().to_string(),
            album: album.trim().to_string(),
            line,
        }
    }

    pub fn is_malformed(&self) -> bool {
        self.artist.is_empty() || self.album.is_empty()
    }

    pub fn key(&self) -> String {
        format!("{} - {}", self.artist, self.album)
    }
}

/// Splits list text into entries. Blank lines and `#` comments are skipped;
/// the first `" - "` separates artist from album, later ones stay in the
/// album. Lines without a separator come back malformed (empty album).
pub fn parse_album_list(content: &str) -> Vec<ListEntry> {
    content
        .strip_prefix('\u{feff}')
        .unwrap_or(content)
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            let entry = match raw.split_once(" - ") {
                Some((artist, album)) => ListEntry::new(artist, album, index + 1),
                None => ListEntry::new(trimmed, "", index + 1),
            };
            Some(entry)
        })
        .collect()
}

pub fn read_album_list(path: &Path) -> AlbumListResult<Vec<ListEntry>> {
    if !path.exists() {
        return Err(Report::new(AlbumListError)
            .attach_printable(format!("List file not found at {}", path.display())));
    }
    let content = fs::read_to_string(path)
        .into_report()
        .attach_printable(format!("Failed to read list file at {}", path.display()))
        .change_context(AlbumListError)?;
    Ok(parse_album_list(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let entries = parse_album_list("A - B\n# comment\n\nC - D\n");
        assert_eq!(
            entries,
            vec![ListEntry::new("A", "B", 1), ListEntry::new("C", "D", 4)]
        );
    }

    #[test]
    fn test_parse_keeps_dashes_inside_album() {
        let entries = parse_album_list("Pink Floyd - Live - At Pompeii\r\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].artist, "Pink Floyd");
        assert_eq!(entries[0].album, "Live - At Pompeii");
    }

    #[test]
    fn test_parse_indented_comment_is_skipped() {
        let entries = parse_album_list("   # Artist - Album\nX - Y");
        assert_eq!(entries, vec![ListEntry::new("X", "Y", 2)]);
    }

    #[test]
    fn test_parse_flags_malformed_lines() {
        let entries = parse_album_list("Just An Artist\nSomeone -  \n - Orphan Album\n");
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(ListEntry::is_malformed));
        assert_eq!(entries[0].artist, "Just An Artist");
        assert_eq!(entries[0].album, "");
    }

    #[test]
    fn test_parse_ignores_byte_order_mark() {
        let entries = parse_album_list("\u{feff}# my albums\nA - B\n");
        assert_eq!(entries, vec![ListEntry::new("A", "B", 2)]);
        let entries = parse_album_list("\u{feff}A - B\n");
        assert_eq!(entries, vec![ListEntry::new("A", "B", 1)]);
    }

    #[test]
    fn test_read_missing_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_album_list(&dir.path().join("missing.txt")).is_err());
    }
}
