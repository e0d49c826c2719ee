use std::fmt;
use std::path::PathBuf;

use colored::Colorize;
use error_stack::ResultExt;
use log::{debug, warn};

use crate::album_list::ListEntry;
use crate::batch::add_tracks;
use crate::overrides::OverrideMap;
use crate::report::{MissRecord, RunReport};
use crate::resolver::AlbumResolver;
use crate::spotify::{Catalog, NewPlaylist, PlaylistRef};
use crate::tracks::expand_tracks;

pub mod outcome;

use outcome::{delivery, start, AlbumSource, Delivery, EntryOutcome, ResolvedAlbum, Start};

#[derive(Debug)]
pub struct PipelineError;

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pipeline error")
    }
}

impl std::error::Error for PipelineError {}

pub type PipelineResult<T> = error_stack::Result<T, PipelineError>;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub playlist_name: String,
    pub description: String,
    pub public: bool,
    pub dry_run: bool,
    pub list_path: PathBuf,
    pub report_path: PathBuf,
}

/// State owned by one run: the playlist being filled and the entries that
/// missed so far.
#[derive(Debug, Default)]
pub struct RunContext {
    pub playlist: Option<PlaylistRef>,
    pub misses: Vec<MissRecord>,
    pub outcomes: Vec<EntryOutcome>,
    /// Entry being processed, for the abort message.
    current: Option<String>,
}

impl RunContext {
    fn record(&mut self, entry: &ListEntry, outcome: EntryOutcome) {
        if outcome.is_miss() {
            self.misses.push(MissRecord {
                artist: entry.artist.clone(),
                album: entry.album.clone(),
            });
        }
        self.outcomes.push(outcome);
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub report: RunReport,
    pub playlist: Option<PlaylistRef>,
    pub outcomes: Vec<EntryOutcome>,
}

impl RunSummary {
    pub fn tracks_added(&self) -> usize {
        self.outcomes.iter().map(EntryOutcome::tracks_added).sum()
    }
}

/// Drives the list through lookup, track expansion and insertion, strictly
/// one entry after the other, and writes the miss report at the end.
pub struct Pipeline<'a, C: Catalog> {
    catalog: &'a C,
    overrides: &'a OverrideMap,
    options: RunOptions,
}

impl<'a, C: Catalog> Pipeline<'a, C> {
    pub fn new(catalog: &'a C, overrides: &'a OverrideMap, options: RunOptions) -> Self {
        Self {
            catalog,
            overrides,
            options,
        }
    }

    /// Runs every entry. On a fatal error the report collected so far is
    /// still written, marked as aborted, before the error is returned.
    pub async fn run(&self, entries: &[ListEntry]) -> PipelineResult<RunSummary> {
        let mut context = RunContext::default();
        let result = self.run_entries(&mut context, entries).await;

        let mut report = RunReport::new(
            &self.options.playlist_name,
            &self.options.list_path.to_string_lossy(),
            self.options.dry_run,
            context.misses.clone(),
        );

        if let Err(err) = result {
            let reason = match &context.current {
                Some(current) => format!("aborted while processing {}", current),
                None => "aborted before processing the list".to_string(),
            };
            report.aborted_reason = Some(reason);
            if let Err(save_err) = report.save(&self.options.report_path) {
                warn!("could not write the partial report: {:?}", save_err);
            } else {
                println!(
                    "Partial report written to {}",
                    self.options.report_path.display().to_string().yellow()
                );
            }
            return Err(err);
        }

        report
            .save(&self.options.report_path)
            .change_context(PipelineError)?;
        Ok(RunSummary {
            report,
            playlist: context.playlist,
            outcomes: context.outcomes,
        })
    }

    async fn run_entries(
        &self,
        context: &mut RunContext,
        entries: &[ListEntry],
    ) -> PipelineResult<()> {
        if self.options.dry_run {
            println!("{}", "Dry run: no playlist will be created".yellow());
        } else {
            let playlist = self.create_playlist().await?;
            println!(
                "Created playlist {}: {}",
                self.options.playlist_name.green(),
                playlist.url.cyan()
            );
            context.playlist = Some(playlist);
        }

        let total = entries.len();
        for (index, entry) in entries.iter().enumerate() {
            context.current = Some(format!("line {} ({})", entry.line, entry.key()));
            println!(
                "[{}/{}] {} - {}",
                index + 1,
                total,
                entry.artist.cyan(),
                entry.album.yellow()
            );
            let outcome = self.process_entry(context, index, entry).await?;
            println!("    {}", outcome);
            context.record(entry, outcome);
        }
        context.current = None;
        Ok(())
    }

    async fn create_playlist(&self) -> PipelineResult<PlaylistRef> {
        let user_id = self
            .catalog
            .current_user_id()
            .await
            .change_context(PipelineError)
            .attach_printable("Failed to read the current Spotify user")?;
        let new_playlist = NewPlaylist {
            name: self.options.playlist_name.clone(),
            public: self.options.public,
            description: self.options.description.clone(),
        };
        self.catalog
            .create_playlist(&user_id, &new_playlist)
            .await
            .change_context(PipelineError)
            .attach_printable(format!(
                "Failed to create playlist {}",
                self.options.playlist_name
            ))
    }

    async fn process_entry(
        &self,
        context: &RunContext,
        index: usize,
        entry: &ListEntry,
    ) -> PipelineResult<EntryOutcome> {
        if start(entry) == Start::Malformed {
            return Ok(EntryOutcome::Malformed);
        }

        let resolved = self.resolve_album(index, entry).await?;
        debug!(
            "entry {} ({}) resolved to {:?}",
            resolved.entry_index, resolved.key, resolved.album
        );
        let (album_id, source) = match resolved.album {
            Some(album) => album,
            None => return Ok(EntryOutcome::Unresolved),
        };

        let track_ids = expand_tracks(self.catalog, &album_id)
            .await
            .change_context(PipelineError)
            .attach_printable(format!("Failed to list the tracks of album {}", album_id))?;
        let track_count = track_ids.len();

        match delivery(self.options.dry_run, context.playlist.as_ref()) {
            Delivery::DryRun => Ok(EntryOutcome::WouldAdd {
                album_id,
                source,
                track_count,
            }),
            Delivery::NoPlaylist => Ok(EntryOutcome::NoPlaylist { album_id }),
            Delivery::Insert(playlist) => {
                add_tracks(self.catalog, &playlist.id, &track_ids)
                    .await
                    .change_context(PipelineError)
                    .attach_printable(format!(
                        "Failed to add album {} to playlist {}",
                        album_id, playlist.id
                    ))?;
                Ok(EntryOutcome::Added {
                    album_id,
                    source,
                    track_count,
                })
            }
        }
    }

    /// An override short-circuits the search entirely.
    async fn resolve_album(&self, index: usize, entry: &ListEntry) -> PipelineResult<ResolvedAlbum> {
        let key = entry.key();
        if let Some(album_id) = self.overrides.lookup(&entry.artist, &entry.album) {
            debug!("override for {} -> {}", key, album_id);
            return Ok(ResolvedAlbum {
                entry_index: index,
                key,
                album: Some((album_id, AlbumSource::Override)),
            });
        }
        let resolution = AlbumResolver::new(self.catalog)
            .resolve(&entry.artist, &entry.album)
            .await
            .change_context(PipelineError)
            .attach_printable(format!("Album search failed for {}", key))?;
        Ok(ResolvedAlbum {
            entry_index: index,
            key,
            album: resolution
                .map(|resolution| (resolution.candidate.id, AlbumSource::Search(resolution.rule))),
        })
    }
}
