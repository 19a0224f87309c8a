//! Run summary and machine-readable reports

pub mod csv;
pub mod json;

use crate::logger::Logger;
use crate::verifier::{Outcome, Verification};
use colored::Color;
use std::io;
use std::path::Path;

/// Write a report in the format matching the file extension:
/// `.json` for JSON, CSV for anything else
pub fn generate<P: AsRef<Path>>(path: P, results: &[Verification]) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "json" => json::write(&mut file, results),
        _ => csv::write(&mut file, results),
    }
}

/// Counts for a batch of results. Files that were never verified are not
/// counted anywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub seen: usize,
    pub pass: usize,
    pub unsupported: usize,
    pub fail: usize,
}

impl Summary {
    pub fn from_results(results: &[Verification]) -> Self {
        let mut summary = Self::default();

        for r in results {
            match r.outcome {
                Outcome::NotACandidate => continue,
                Outcome::Ok => summary.pass += 1,
                Outcome::Unsupported => summary.unsupported += 1,
                Outcome::TagMismatch | Outcome::MusicMismatch => summary.fail += 1,
            }
            summary.seen += 1;
        }

        summary
    }
}

/// Console line for one result: `P ABCD:ABCD 1234:1234 path`
pub fn result_line(result: &Verification, display_path: &str, logger: &Logger) -> String {
    let (letter, color) = match result.outcome {
        Outcome::Ok => ("P", Color::Green),
        Outcome::Unsupported => ("U", Color::Yellow),
        Outcome::TagMismatch | Outcome::MusicMismatch => ("F", Color::Red),
        Outcome::NotACandidate => ("-", Color::White),
    };
    let status = format!("{} {}", letter, result.checksums);
    format!("{} {}", logger.paint(&status, color), display_path)
}

/// Closing line of a run: `3 file(s) checked: 1 pass, 1 unsupported, 1 fail`
pub fn summary_line(summary: &Summary, logger: &Logger) -> String {
    format!(
        "{} file(s) checked: {} pass, {} unsupported, {} fail",
        summary.seen,
        logger.paint(&summary.pass.to_string(), Color::Green),
        logger.paint(&summary.unsupported.to_string(), Color::Yellow),
        logger.paint(&summary.fail.to_string(), Color::Red)
    )
}

/// Combined exit status bits of all results
pub fn exit_bits(results: &[Verification]) -> i32 {
    results.iter().fold(0, |acc, r| acc | r.outcome.code())
}
