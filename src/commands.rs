use std::fmt;
use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use error_stack::ResultExt;

use crate::album_list::read_album_list;
use crate::auth::spotify_auth::SpotifyAuth;
use crate::config::{AppConfig, Credentials};
use crate::overrides::OverrideMap;
use crate::pipeline::{Pipeline, RunOptions};
use crate::resolver::AlbumResolver;
use crate::spotify::api::SpotifyApi;

#[derive(Debug)]
pub struct CommandError;

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Command error")
    }
}

impl std::error::Error for CommandError {}

pub type CommandResult<T> = error_stack::Result<T, CommandError>;

async fn authorized_api() -> CommandResult<SpotifyApi> {
    let credentials = Credentials::from_env().change_context(CommandError)?;
    let token = SpotifyAuth::new(credentials)
        .login()
        .await
        .change_context(CommandError)?;
    Ok(SpotifyApi::new(token))
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct BuildCommand {
    /// Text file with one "Artist - Album" per line
    pub list: PathBuf,
    /// Name of the playlist to create
    #[clap(long, short)]
    pub name: String,
    /// Playlist description
    #[clap(long, default_value = "")]
    pub description: String,
    /// Make the playlist public
    #[clap(long, action)]
    pub public: bool,
    /// Resolve albums and count tracks without creating a playlist
    #[clap(long, action)]
    pub dry_run: bool,
    /// JSON file pinning "Artist - Album" keys to album ids
    #[clap(long, default_value = AppConfig::DEFAULT_OVERRIDES_FILE)]
    pub overrides: PathBuf,
    /// Where to write the miss report
    #[clap(long, default_value = AppConfig::DEFAULT_REPORT_FILE)]
    pub report: PathBuf,
}

impl BuildCommand {
    pub async fn execute(&self) -> CommandResult<()> {
        let entries = read_album_list(&self.list).change_context(CommandError)?;
        println!(
            "Read {} entries from {}",
            entries.len().to_string().cyan(),
            self.list.display()
        );
        let overrides = OverrideMap::load(&self.overrides);
        if !overrides.is_empty() {
            println!("Loaded {} overrides", overrides.len().to_string().cyan());
        }

        let api = authorized_api().await?;
        let options = RunOptions {
            playlist_name: self.name.clone(),
            description: self.description.clone(),
            public: self.public,
            dry_run: self.dry_run,
            list_path: self.list.clone(),
            report_path: self.report.clone(),
        };
        let summary = Pipeline::new(&api, &overrides, options)
            .run(&entries)
            .await
            .change_context(CommandError)?;

        if let Some(playlist) = &summary.playlist {
            println!(
                "Added {} tracks to {}",
                summary.tracks_added().to_string().green(),
                playlist.url.cyan()
            );
        }
        if summary.report.misses.is_empty() {
            println!("{}", "Every album was found".green());
        } else {
            println!(
                "{} albums were not added:",
                summary.report.misses.len().to_string().red()
            );
            println!("{}", summary.report.misses_table());
        }
        println!(
            "Report written to {}",
            self.report.display().to_string().yellow()
        );
        Ok(())
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ResolveCommand {
    #[clap(long)]
    pub artist: String,
    #[clap(long)]
    pub album: String,
    /// JSON file pinning "Artist - Album" keys to album ids
    #[clap(long, default_value = AppConfig::DEFAULT_OVERRIDES_FILE)]
    pub overrides: PathBuf,
}

impl ResolveCommand {
    pub async fn execute(&self) -> CommandResult<()> {
        let key = OverrideMap::key(&self.artist, &self.album);
        let overrides = OverrideMap::load(&self.overrides);
        if let Some(album_id) = overrides.lookup(&self.artist, &self.album) {
            println!(
                "{} is pinned to https://open.spotify.com/album/{}",
                key.cyan(),
                album_id.green()
            );
            return Ok(());
        }

        let api = authorized_api().await?;
        let resolution = AlbumResolver::new(&api)
            .resolve(&self.artist, &self.album)
            .await
            .change_context(CommandError)?;
        match resolution {
            Some(resolution) => {
                println!(
                    "{} -> {} by {} ({})",
                    key.cyan(),
                    resolution.candidate.name.green(),
                    resolution.candidate.artist_name.green(),
                    resolution.rule
                );
                println!("{}", resolution.candidate.url());
                println!(
                    "To pin it, add \"{}\": \"{}\" to {}",
                    key,
                    resolution.candidate.uri,
                    self.overrides.display()
                );
            }
            None => println!("{} {}", "No album found for".red(), key),
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct CheckCommand {
    /// Text file with one "Artist - Album" per line
    pub list: PathBuf,
    /// JSON file pinning "Artist - Album" keys to album ids
    #[clap(long, default_value = AppConfig::DEFAULT_OVERRIDES_FILE)]
    pub overrides: PathBuf,
}

impl CheckCommand {
    pub fn execute(&self) -> CommandResult<()> {
        let entries = read_album_list(&self.list).change_context(CommandError)?;
        let overrides = OverrideMap::load(&self.overrides);
        let mut malformed = 0;
        let mut pinned = 0;
        for entry in &entries {
            if entry.is_malformed() {
                malformed += 1;
                println!(
                    "line {}: {} {:?}",
                    entry.line,
                    "malformed".red(),
                    entry.key()
                );
            } else if overrides.lookup(&entry.artist, &entry.album).is_some() {
                pinned += 1;
            }
        }
        println!(
            "{} entries, {} malformed, {} pinned by overrides",
            entries.len().to_string().cyan(),
            malformed.to_string().red(),
            pinned.to_string().green()
        );
        Ok(())
    }
}
