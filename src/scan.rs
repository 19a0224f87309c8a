//! Input traversal: turn command-line paths into the list of files to verify

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("cannot read directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Files collected from the input paths, plus whatever could not be read
#[derive(Debug, Default)]
pub struct Scan {
    pub files: Vec<PathBuf>,
    pub errors: Vec<ScanError>,
}

impl Scan {
    /// Exit status contribution: 1 if any input was missing or unreadable
    pub fn exit_bits(&self) -> i32 {
        i32::from(!self.errors.is_empty())
    }
}

/// Whether a name looks like an MP3 worth verifying.
///
/// AppleDouble companions (`._track.mp3`) share the extension but hold no audio.
pub fn is_mp3_name(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("._"));

    let mp3 = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"));

    mp3 && !hidden
}

/// A regular file with an MP3 name
pub fn is_candidate(path: &Path) -> bool {
    is_mp3_name(path) && path.is_file()
}

/// Expand the command-line paths.
///
/// Files are taken as given, whatever their name. Directories contribute
/// their candidates sorted by name, descending into sub-directories only when
/// `recursive` is set.
pub fn collect_paths<P: AsRef<Path>>(paths: &[P], recursive: bool) -> Scan {
    let mut scan = Scan::default();

    for path in paths {
        let path = path.as_ref();

        if !path.exists() {
            scan.errors.push(ScanError::NotFound(path.to_path_buf()));
        } else if path.is_dir() {
            walk(path, recursive, &mut scan);
        } else {
            scan.files.push(path.to_path_buf());
        }
    }

    scan
}

fn walk(dir: &Path, recursive: bool, scan: &mut Scan) {
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(if recursive { usize::MAX } else { 1 })
        .sort_by_file_name();

    for entry in walker {
        match entry {
            Ok(entry) if is_candidate(entry.path()) => {
                scan.files.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => scan.errors.push(ScanError::from(e)),
        }
    }
}
