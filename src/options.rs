//! Command-line definition and option normalisation

use crate::logger::Level;
use crate::verifier::Outcome;
use clap::{ArgAction, CommandFactory, Parser};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "mp3sum", version)]
#[command(about = "Verify MP3 files against the CRC checksums embedded by the LAME encoder")]
pub struct Cli {
    /// Decrease verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,

    /// Increase verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Show absolute file paths in output
    #[arg(long)]
    pub absolute: bool,

    /// Show file base names in output
    #[arg(long)]
    pub basename: bool,

    /// Batch scripting mode: no colour, default verbosity
    #[arg(short, long)]
    pub batch: bool,

    /// Always use colour
    #[arg(long, aliases = ["color", "colours", "colors"], overrides_with = "no_colour")]
    pub colour: bool,

    /// Never use colour
    #[arg(
        long,
        aliases = ["no-color", "no-colours", "no-colors", "nocolor", "nocolours", "nocolors"],
        overrides_with = "colour"
    )]
    pub no_colour: bool,

    /// Only show failing results
    #[arg(short = 'f', long, aliases = ["onlyfail", "fail"])]
    pub only_fail: bool,

    /// Only show unsupported results
    #[arg(short = 'u', long, aliases = ["onlyunsupported", "only-skip", "onlyskip"])]
    pub only_unsupported: bool,

    #[arg(long, value_enum, hide = true, aliases = ["log", "loglevel"])]
    pub log_level: Option<Level>,

    /// Recurse into sub-directories
    #[arg(short, long, short_alias = 'R', alias = "recurse")]
    pub recursive: bool,

    /// Number of worker threads
    #[arg(long, value_name = "num", value_parser = clap::value_parser!(u32).range(1..))]
    pub workers: Option<u32>,

    /// Write a JSON (.json) or CSV report of all results
    #[arg(long, value_name = "path")]
    pub report: Option<PathBuf>,

    /// File(s) or folder(s) to verify
    #[arg(value_name = "path")]
    pub paths: Vec<PathBuf>,
}

impl Cli {
    /// One-line usage, as printed before argument errors
    pub fn usage() -> String {
        Cli::command().render_usage().to_string()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("path not supplied")]
    NoPaths,
}

/// How result lines show a file's path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathDisplay {
    #[default]
    AsGiven,
    Absolute,
    Basename,
}

impl PathDisplay {
    pub fn render(self, path: &Path) -> String {
        match self {
            PathDisplay::AsGiven => path.display().to_string(),
            PathDisplay::Absolute => std::path::absolute(path)
                .unwrap_or_else(|_| path.to_path_buf())
                .display()
                .to_string(),
            PathDisplay::Basename => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }
}

/// Which result classes get a result line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowFilter {
    pub pass: bool,
    pub unsupported: bool,
    pub fail: bool,
}

impl Default for ShowFilter {
    fn default() -> Self {
        Self {
            pass: true,
            unsupported: true,
            fail: true,
        }
    }
}

impl ShowFilter {
    pub fn shows(&self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::NotACandidate => false,
            Outcome::Ok => self.pass,
            Outcome::Unsupported => self.unsupported,
            Outcome::TagMismatch | Outcome::MusicMismatch => self.fail,
        }
    }
}

/// Normalised run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub verbosity: i32,
    pub level: Level,
    pub colour: bool,
    pub display: PathDisplay,
    pub show: ShowFilter,
    pub recursive: bool,
    pub workers: usize,
    pub report: Option<PathBuf>,
    pub paths: Vec<PathBuf>,
}

impl Options {
    /// Normalise parsed arguments against the current process environment
    pub fn from_env(cli: Cli) -> Result<Self, OptionsError> {
        let parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::from_cli(cli, std::io::stdout().is_terminal(), parallelism)
    }

    pub fn from_cli(cli: Cli, stdout_is_terminal: bool, parallelism: usize) -> Result<Self, OptionsError> {
        if cli.paths.is_empty() {
            return Err(OptionsError::NoPaths);
        }

        let mut verbosity = i32::from(cli.verbose) - i32::from(cli.quiet);
        let mut colour = match (cli.colour, cli.no_colour) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };

        if cli.batch {
            colour = Some(false);
            verbosity = 0;
        }

        let level = cli
            .log_level
            .unwrap_or_else(|| Level::from_verbosity(verbosity));

        let show = if cli.only_fail || cli.only_unsupported {
            ShowFilter {
                pass: false,
                unsupported: cli.only_unsupported,
                fail: cli.only_fail,
            }
        } else {
            ShowFilter::default()
        };

        // Interleaved narration from several workers is unreadable
        let workers = if verbosity >= 2 || level == Level::Debug {
            1
        } else {
            cli.workers.map_or(parallelism.max(1), |n| n as usize)
        };

        let display = if cli.absolute {
            PathDisplay::Absolute
        } else if cli.basename {
            PathDisplay::Basename
        } else {
            PathDisplay::AsGiven
        };

        Ok(Options {
            verbosity,
            level,
            colour: colour.unwrap_or(stdout_is_terminal),
            display,
            show,
            recursive: cli.recursive,
            workers,
            report: cli.report,
            paths: cli.paths,
        })
    }
}
