//! JSON report generation

use crate::report::Summary;
use crate::verifier::{hex, Outcome, Verification};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct JsonReport {
    generated: String,
    summary: JsonSummary,
    files: Vec<JsonFile>,
}

#[derive(Serialize)]
struct JsonSummary {
    seen: usize,
    pass: usize,
    unsupported: usize,
    fail: usize,
}

#[derive(Serialize)]
struct JsonFile {
    path: String,
    outcome: Outcome,
    tag_computed: String,
    tag_stored: String,
    music_computed: String,
    music_stored: String,
}

impl From<&Verification> for JsonFile {
    fn from(r: &Verification) -> Self {
        Self {
            path: r.path.display().to_string(),
            outcome: r.outcome,
            tag_computed: hex(r.checksums.tag_computed),
            tag_stored: hex(r.checksums.tag_stored),
            music_computed: hex(r.checksums.music_computed),
            music_stored: hex(r.checksums.music_stored),
        }
    }
}

pub fn write<W: Write>(writer: &mut W, results: &[Verification]) -> io::Result<()> {
    let summary = Summary::from_results(results);

    let report = JsonReport {
        generated: chrono::Utc::now().to_rfc3339(),
        summary: JsonSummary {
            seen: summary.seen,
            pass: summary.pass,
            unsupported: summary.unsupported,
            fail: summary.fail,
        },
        files: results
            .iter()
            .filter(|r| r.outcome != Outcome::NotACandidate)
            .map(JsonFile::from)
            .collect(),
    };

    let json = serde_json::to_string_pretty(&report)
        .map_err(io::Error::other)?;

    writer.write_all(json.as_bytes())?;
    writeln!(writer)
}
