//! MP3 integrity verification
//!
//! Checks the two CRC-16 values LAME (3.90 and later) stores in the Info tag
//! of the first frame against freshly computed ones:
//!
//! 1. skip any ID3v2 tags to reach the first frame
//! 2. parse the Xing/Info + LAME tag and read the stored TagCRC and MusicCRC
//! 3. recompute the TagCRC over the tag itself
//! 4. find the next frame (audio start) and the first trailing tag (audio end)
//! 5. recompute the MusicCRC over the audio in between
//!
//! Every stage either hands its findings to the next or ends the run with an
//! [`Outcome`]. Nothing structural ever escapes as an error.

mod session;

use crate::logger::{Level, Logger};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use session::Session;

/// Classification of one verified file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// Not verified at all (interrupted before the result was collected)
    NotACandidate,
    /// Both checksums match
    Ok,
    /// No usable LAME checksums; the file cannot be verified
    Unsupported,
    /// The Info tag was altered after encoding
    TagMismatch,
    /// The audio was altered, truncated, or could not be located
    MusicMismatch,
}

impl Outcome {
    /// Bit contributed to the process exit status
    pub fn code(self) -> i32 {
        match self {
            Outcome::NotACandidate | Outcome::Ok => 0,
            Outcome::Unsupported => 2,
            Outcome::TagMismatch => 4,
            Outcome::MusicMismatch => 8,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NotACandidate => write!(f, "NOT_A_CANDIDATE"),
            Outcome::Ok => write!(f, "OK"),
            Outcome::Unsupported => write!(f, "UNSUPPORTED"),
            Outcome::TagMismatch => write!(f, "TAG_MISMATCH"),
            Outcome::MusicMismatch => write!(f, "MUSIC_MISMATCH"),
        }
    }
}

/// Stored and computed CRCs; `None` where a stage never got that far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checksums {
    pub tag_stored: Option<u16>,
    pub tag_computed: Option<u16>,
    pub music_stored: Option<u16>,
    pub music_computed: Option<u16>,
}

/// Format a checksum for display, `0000` when absent
pub fn hex(value: Option<u16>) -> String {
    format!("{:04X}", value.unwrap_or(0))
}

impl fmt::Display for Checksums {
    /// `computed:stored` for the tag, then for the music
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}:{}",
            hex(self.tag_computed),
            hex(self.tag_stored),
            hex(self.music_computed),
            hex(self.music_stored)
        )
    }
}

/// Result of verifying one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub path: PathBuf,
    pub outcome: Outcome,
    pub checksums: Checksums,
}

impl Verification {
    /// The placeholder for a file whose result was discarded
    pub fn not_a_candidate(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            outcome: Outcome::NotACandidate,
            checksums: Checksums::default(),
        }
    }
}

/// Verify an MP3 held by any seekable reader
pub fn verify_reader<R: Read + Seek>(reader: &mut R, logger: &Logger) -> (Outcome, Checksums) {
    let mut session = Session::new(reader, logger);
    let outcome = match session.run() {
        Ok(()) => Outcome::Ok,
        Err(outcome) => outcome,
    };
    (outcome, session.checksums())
}

/// Verify the MP3 file at `path`.
///
/// A file that cannot be opened is reported as unsupported.
pub fn verify_path<P: AsRef<Path>>(path: P, logger: &Logger) -> Verification {
    let path = path.as_ref();

    let (outcome, checksums) = match File::open(path) {
        Ok(mut file) => verify_reader(&mut file, logger),
        Err(e) => {
            logger.complain(Level::Warning, format!("cannot read {}: {}", path.display(), e));
            (Outcome::Unsupported, Checksums::default())
        }
    };

    Verification {
        path: path.to_path_buf(),
        outcome,
        checksums,
    }
}
