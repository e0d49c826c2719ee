use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use comfy_table::Table;
use error_stack::{IntoReport, ResultExt};
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub struct ReportError;

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Report error")
    }
}

impl std::error::Error for ReportError {}

pub type ReportResult<T> = error_stack::Result<T, ReportError>;

/// An entry whose tracks never made it into the playlist, with the text the
/// user wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissRecord {
    pub artist: String,
    pub album: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub generated_at: String,
    pub playlist_name: String,
    pub list_path: String,
    pub dry_run: bool,
    pub misses: Vec<MissRecord>,
    /// Set when a fatal error cut the run short; `misses` then only covers the
    /// entries processed before it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted_reason: Option<String>,
}

impl RunReport {
    pub fn new(playlist_name: &str, list_path: &str, dry_run: bool, misses: Vec<MissRecord>) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            playlist_name: playlist_name.to_string(),
            list_path: list_path.to_string(),
            dry_run,
            misses,
            aborted_reason: None,
        }
    }

    /// Writes the report, replacing whatever a previous run left there.
    pub fn save(&self, path: &Path) -> ReportResult<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .into_report()
                .attach_printable(format!("Failed to create directory {}", parent.display()))
                .change_context(ReportError)?;
        }
        let serialized = serde_json::to_string_pretty(self)
            .into_report()
            .change_context(ReportError)?;
        fs::write(path, serialized)
            .into_report()
            .attach_printable(format!("Failed to write report at {}", path.display()))
            .change_context(ReportError)?;
        Ok(())
    }

    pub fn misses_table(&self) -> Table {
        let mut table = Table::new();
        table.set_header(vec!["Artist", "Album"]);
        for miss in &self.misses {
            table.add_row(vec![miss.artist.clone(), miss.album.clone()]);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn miss(artist: &str, album: &str) -> MissRecord {
        MissRecord {
            artist: artist.to_string(),
            album: album.to_string(),
        }
    }

    #[test]
    fn test_report_json_shape() {
        let report = RunReport::new("Mix", "albums.txt", true, vec![miss("C", "D")]);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["playlistName"], "Mix");
        assert_eq!(value["listPath"], "albums.txt");
        assert_eq!(value["dryRun"], true);
        assert_eq!(value["misses"][0]["artist"], "C");
        assert_eq!(value["misses"][0]["album"], "D");
        assert!(value.get("abortedReason").is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(value["generatedAt"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_save_overwrites_previous_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");
        RunReport::new("Mix", "a.txt", false, vec![miss("A", "B"), miss("C", "D")])
            .save(&path)
            .unwrap();
        RunReport::new("Mix", "a.txt", false, vec![]).save(&path).unwrap();
        let saved: RunReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(saved.misses.is_empty());
    }
}
