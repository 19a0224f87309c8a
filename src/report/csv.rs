//! CSV report generation

use crate::verifier::{hex, Outcome, Verification};
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, results: &[Verification]) -> io::Result<()> {
    writeln!(
        writer,
        "outcome,path,tag_computed,tag_stored,music_computed,music_stored"
    )?;

    for r in results.iter().filter(|r| r.outcome != Outcome::NotACandidate) {
        let sums = &r.checksums;
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            r.outcome,
            escape_csv(&r.path.display().to_string()),
            hex(sums.tag_computed),
            hex(sums.tag_stored),
            hex(sums.music_computed),
            hex(sums.music_stored)
        )?;
    }

    Ok(())
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
