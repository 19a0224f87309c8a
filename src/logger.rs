//! Leveled console output
//!
//! A `Logger` is a plain value handed to whoever needs to print. It carries
//! the level threshold, whether to colour, and where lines go. Every message
//! is written as one whole line under the stream lock, so workers printing
//! at the same time never interleave inside a line.

use colored::{Color, Colorize};
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    /// Map a -v/-q balance to a level: 0 shows warnings and up
    pub fn from_verbosity(verbosity: i32) -> Self {
        match verbosity {
            v if v <= -2 => Level::Critical,
            -1 => Level::Error,
            0 => Level::Warning,
            1 => Level::Info,
            _ => Level::Debug,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Debug => write!(f, "DEBUG"),
            Level::Info => write!(f, "INFO"),
            Level::Warning => write!(f, "WARNING"),
            Level::Error => write!(f, "ERROR"),
            Level::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// A line recorded by a capturing logger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub level: Level,
    pub stream: Stream,
    pub text: String,
}

#[derive(Debug, Clone)]
enum Sink {
    Console,
    Capture(Arc<Mutex<Vec<Line>>>),
}

/// Handle to the lines recorded by [`Logger::capture`]
#[derive(Debug, Clone)]
pub struct Captured(Arc<Mutex<Vec<Line>>>);

impl Captured {
    pub fn lines(&self) -> Vec<Line> {
        self.0.lock().map(|lines| lines.clone()).unwrap_or_default()
    }

    pub fn texts(&self) -> Vec<String> {
        self.lines().into_iter().map(|l| l.text).collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.text.contains(needle))
    }
}

#[derive(Debug, Clone)]
pub struct Logger {
    level: Level,
    colour: bool,
    prefix: String,
    sink: Sink,
}

impl Logger {
    pub fn new(level: Level, colour: bool) -> Self {
        Self {
            level,
            colour,
            prefix: env!("CARGO_PKG_NAME").to_string(),
            sink: Sink::Console,
        }
    }

    /// A logger that records lines instead of printing them
    pub fn capture(level: Level) -> (Self, Captured) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let logger = Self {
            level,
            colour: false,
            prefix: env!("CARGO_PKG_NAME").to_string(),
            sink: Sink::Capture(Arc::clone(&lines)),
        };
        (logger, Captured(lines))
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    /// Colour `text` if this logger colours at all
    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.colour {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn log(&self, level: Level, message: impl fmt::Display) {
        self.emit(level, Stream::Stdout, message.to_string());
    }

    /// Log to stderr with the program name in front
    pub fn complain(&self, level: Level, message: impl fmt::Display) {
        let text = format!("{}: {}", self.prefix, message);
        self.emit(level, Stream::Stderr, text);
    }

    /// Log to stderr without a prefix
    pub fn log_stderr(&self, level: Level, message: impl fmt::Display) {
        self.emit(level, Stream::Stderr, message.to_string());
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(Level::Warning, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(Level::Error, message);
    }

    fn emit(&self, level: Level, stream: Stream, text: String) {
        if !self.enabled(level) {
            return;
        }

        match &self.sink {
            Sink::Console => {
                // A closed pipe is not worth dying over
                let _ = match stream {
                    Stream::Stdout => writeln!(io::stdout().lock(), "{}", text),
                    Stream::Stderr => writeln!(io::stderr().lock(), "{}", text),
                };
            }
            Sink::Capture(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(Line { level, stream, text });
                }
            }
        }
    }
}

/// Format a file offset for diagnostics: `0x0000abcd (43981)`
pub fn format_offset(offset: u64) -> String {
    format!("0x{:08x} ({})", offset, offset)
}
