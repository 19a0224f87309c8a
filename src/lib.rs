//! mp3sum - verify MP3 files against the CRC checksums LAME embeds
//!
//! LAME 3.90 and later store two CRC-16 values in the Info tag of the first
//! frame: one over the tag itself and one over the audio that follows. If
//! either no longer matches, the file was altered after encoding.
//!
//! ```no_run
//! use mp3sum::{verify_path, Level, Logger, Outcome};
//!
//! let logger = Logger::new(Level::Warning, false);
//! let result = verify_path("track.mp3", &logger);
//! if result.outcome == Outcome::Ok {
//!     println!("{} is intact", result.path.display());
//! }
//! ```

pub mod checksum;
pub mod logger;
pub mod mp3;
pub mod options;
pub mod pool;
pub mod report;
pub mod scan;
pub mod verifier;

pub use logger::{Level, Logger};
pub use options::{Cli, Options};
pub use pool::Pool;
pub use verifier::{verify_path, verify_reader, Checksums, Outcome, Verification};
