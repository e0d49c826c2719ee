use std::fmt;

use clap::{Parser, Subcommand};
use colored::Colorize;
use error_stack::fmt::{Charset, ColorMode};
use error_stack::{Report, ResultExt};

use crate::commands::{BuildCommand, CheckCommand, ResolveCommand};

mod album_list;
mod auth;
mod batch;
mod commands;
mod config;
mod normalize;
mod overrides;
mod pipeline;
mod report;
mod resolver;
mod spotify;
mod tracks;

#[derive(Debug)]
pub struct AlbumWizardError;
impl fmt::Display for AlbumWizardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Album wizard error")
    }
}
impl std::error::Error for AlbumWizardError {}

pub type AlbumWizardResult<T> = error_stack::Result<T, AlbumWizardError>;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Build a Spotify playlist from a list of albums")]
struct Cli {
    /// Print diagnostic logs
    #[clap(long, short, global = true, action)]
    verbose: bool,
    #[command(subcommand)]
    command: AlbumWizardCommands,
}

#[derive(Subcommand, Debug, PartialEq, Clone)]
enum AlbumWizardCommands {
    /// Create a playlist with every track of every album in the list
    Build(BuildCommand),
    /// Show which album an "Artist - Album" pair resolves to
    Resolve(ResolveCommand),
    /// Parse the list offline and report malformed lines
    Check(CheckCommand),
}

impl AlbumWizardCommands {
    pub async fn execute(&self) -> AlbumWizardResult<()> {
        let result = match self {
            AlbumWizardCommands::Build(command) => command.execute().await,
            AlbumWizardCommands::Resolve(command) => command.execute().await,
            AlbumWizardCommands::Check(command) => command.execute(),
        };
        result
            .change_context(AlbumWizardError)
            .attach(Suggestion(self.suggestion().to_string()))
    }

    fn suggestion(&self) -> &'static str {
        match self {
            AlbumWizardCommands::Build(_) => {
                "check SPOTIFY_CLIENT_ID and the list path, or retry with --dry-run --verbose"
            }
            AlbumWizardCommands::Resolve(_) => "check SPOTIFY_CLIENT_ID and retry with --verbose",
            AlbumWizardCommands::Check(_) => "check that the list file exists and is UTF-8 text",
        }
    }
}

pub struct Suggestion(String);

impl Suggestion {
    pub fn set_report() {
        Report::set_charset(Charset::Utf8);
        Report::set_color_mode(ColorMode::Color);
        Report::install_debug_hook::<Self>(|Self(value), context| {
            context.push_body(format!("{}: {value}", "suggestion".yellow()))
        });
    }
}

fn init_logging(verbose: bool) {
    let mut builder = colog::default_builder();
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    builder.filter(None, log::LevelFilter::Warn);
    builder.filter(Some(env!("CARGO_CRATE_NAME")), level);
    builder.init();
}

async fn run() -> AlbumWizardResult<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    Suggestion::set_report();

    cli.command.execute().await?;

    Ok(())
}

#[tokio::main]
async fn main() -> AlbumWizardResult<()> {
    run().await
}
