//! The verification stages for one file

use super::{hex, Checksums, Outcome};
use crate::checksum;
use crate::logger::{format_offset, Logger};
use crate::mp3::frame;
use crate::mp3::id3v2::{self, LeadingTag, TagError};
use crate::mp3::lame::{Encoder, InfoTag, MIN_CRC_VERSION};
use crate::mp3::trailer::TrailingTags;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

/// Bytes read at a time when looking for headers
pub const WINDOW: usize = 1024;

/// Either the value a stage found, or how the whole run ends
type Stage<T> = Result<T, Outcome>;

pub struct Session<'a, R> {
    reader: &'a mut R,
    logger: &'a Logger,
    checksums: Checksums,
}

impl<'a, R: Read + Seek> Session<'a, R> {
    pub fn new(reader: &'a mut R, logger: &'a Logger) -> Self {
        Self {
            reader,
            logger,
            checksums: Checksums::default(),
        }
    }

    pub fn checksums(&self) -> Checksums {
        self.checksums
    }

    pub fn run(&mut self) -> Stage<()> {
        let frame = self.find_first_frame()?;
        let (tag, data) = self.read_info_tag(frame)?;
        self.check_tag_crc(&tag, &data)?;

        let audio_start = self.find_audio_start(frame + tag.size() as u64)?;
        let audio_end = self.find_audio_end()?;
        self.check_music_crc(audio_start, audio_end, tag.music_crc)
    }

    /// Log why the run ends here and hand back the outcome
    fn stop(&self, outcome: Outcome, why: impl fmt::Display) -> Outcome {
        self.logger.debug(why);
        outcome
    }

    fn read_window(&mut self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        self.reader.seek(SeekFrom::Start(offset))?;
        let mut buf = Vec::with_capacity(len);
        (&mut *self.reader).take(len as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Skip any (possibly chained) ID3v2 tags and return the offset of the
    /// first frame sync.
    fn find_first_frame(&mut self) -> Stage<u64> {
        let mut base = 0u64;
        let mut window = self
            .read_window(base, WINDOW)
            .map_err(|e| self.stop(Outcome::Unsupported, format!("Read failed at start of file: {}", e)))?;

        if frame::find_frame(&window) == Some(0) {
            self.logger.debug(format!("Found MP3 frame header at offset {}", format_offset(0)));
            return Ok(0);
        }

        loop {
            let tag = match LeadingTag::parse(&window) {
                Ok(tag) => tag,
                Err(TagError::Truncated(_)) => {
                    return Err(self.stop(
                        Outcome::Unsupported,
                        format!("No MP3 or ID3v2 signature near offset {}", format_offset(base)),
                    ));
                }
                Err(e) => {
                    return Err(self.stop(
                        Outcome::Unsupported,
                        format!("Bad ID3v2 signature at offset {}: {}", format_offset(base), e),
                    ));
                }
            };

            self.logger.debug(format!("Found ID3v2 signature at offset {}", format_offset(base)));
            self.logger.debug(format!(
                "Found ID3v2.{}.{} tag length of {} bytes",
                tag.major, tag.revision, tag.size
            ));
            if tag.has_extended_header() {
                self.logger.debug("Found ID3v2 extended header");
            }
            if tag.has_footer() {
                self.logger.debug("Found ID3v2 footer flag");
            }

            base += tag.total_len();
            window = self.read_window(base, WINDOW).map_err(|e| {
                self.stop(
                    Outcome::Unsupported,
                    format!("Read failed near offset {}: {}", format_offset(base), e),
                )
            })?;

            // Another ID3v2 tag right behind the first one
            if window.starts_with(id3v2::MAGIC) {
                continue;
            }

            return match frame::find_frame(&window) {
                Some(pos) => {
                    let offset = base + pos as u64;
                    self.logger.debug(format!("Found MP3 frame header at offset {}", format_offset(offset)));
                    Ok(offset)
                }
                None => Err(self.stop(
                    Outcome::Unsupported,
                    format!("Missing MP3 frame header near offset {}", format_offset(base)),
                )),
            };
        }
    }

    /// Parse the Info tag at `frame` and record its stored CRCs.
    ///
    /// Returns the tag together with the bytes read from the frame start.
    fn read_info_tag(&mut self, frame: u64) -> Stage<(InfoTag, Vec<u8>)> {
        let data = self.read_window(frame, WINDOW).map_err(|e| {
            self.stop(
                Outcome::Unsupported,
                format!("Read failed at offset {}: {}", format_offset(frame), e),
            )
        })?;

        let tag = InfoTag::parse(&data).map_err(|e| {
            self.stop(
                Outcome::Unsupported,
                format!("Failed to unpack Xing/Info tag near offset {}: {}", format_offset(frame), e),
            )
        })?;

        self.checksums.tag_stored = Some(tag.tag_crc);
        self.checksums.music_stored = Some(tag.music_crc);

        self.logger.debug(format!(
            "Unpacked {} bytes between offsets {} and {}",
            tag.size(),
            format_offset(frame),
            format_offset(frame + tag.size() as u64)
        ));
        self.logger.debug(format!("Found Xing/Info tag {}", tag.magic()));

        match tag.encoder() {
            Encoder::Lame(version) if version < MIN_CRC_VERSION => {
                return Err(self.stop(
                    Outcome::Unsupported,
                    format!("Insufficient LAME version {:?}", tag.encoder_text()),
                ));
            }
            Encoder::Lame(_) => {
                self.logger.debug(format!("Found LAME tag {:?}", tag.encoder_text()));
            }
            Encoder::LameUnknownVersion | Encoder::Other => {
                self.logger.debug(format!("Bad LAME tag {:?}; trying anyway", tag.encoder_text()));
            }
        }

        // LAME leaves both fields zeroed when it did not compute them
        if tag.tag_crc == 0 || tag.music_crc == 0 {
            return Err(self.stop(
                Outcome::Unsupported,
                format!("Bad CRC values {:04X}, {:04X}", tag.tag_crc, tag.music_crc),
            ));
        }

        self.logger.debug(format!(
            "Found tag CRC: {:04X} ({}), music CRC: {:04X} ({})",
            tag.tag_crc, tag.tag_crc, tag.music_crc, tag.music_crc
        ));

        Ok((tag, data))
    }

    fn check_tag_crc(&mut self, tag: &InfoTag, data: &[u8]) -> Stage<()> {
        let computed = checksum::crc16(&data[..tag.crc_span()]);
        self.checksums.tag_computed = Some(computed);

        if computed != tag.tag_crc {
            return Err(self.stop(
                Outcome::TagMismatch,
                format!("Tag CRC mismatch: computed {:04X}, expected {:04X}", computed, tag.tag_crc),
            ));
        }

        self.logger.debug(format!("Computed tag CRC: {:04X}", computed));
        Ok(())
    }

    /// The audio starts at the first frame sync after the Info tag
    fn find_audio_start(&mut self, after: u64) -> Stage<u64> {
        let window = self.read_window(after, WINDOW).map_err(|e| {
            self.stop(
                Outcome::MusicMismatch,
                format!("Read failed at offset {}: {}", format_offset(after), e),
            )
        })?;

        let pos = frame::find_frame(&window).ok_or_else(|| {
            self.stop(
                Outcome::MusicMismatch,
                "Music CRC computation failed: missing next frame",
            )
        })?;

        let offset = after + pos as u64;
        self.logger.debug(format!(
            "Found next frame ({}) at offset {}",
            frame::describe(&window, pos),
            format_offset(offset)
        ));
        Ok(offset)
    }

    /// The audio ends at the earliest trailing tag, or at EOF
    fn find_audio_end(&mut self) -> Stage<u64> {
        let tags = TrailingTags::scan(&mut *self.reader).map_err(|e| {
            self.stop(
                Outcome::MusicMismatch,
                format!("Failed to read the end of the file: {}", e),
            )
        })?;

        let found = [
            ("Lyrics3v2", tags.lyrics3),
            ("APEv2", tags.ape),
            ("ID3v1", tags.id3v1),
        ];
        for (name, offset) in found {
            if let Some(offset) = offset {
                self.logger.debug(format!("Found {} tag at offset {}", name, format_offset(offset)));
            }
        }

        let end = tags.audio_end();
        if tags.is_empty() {
            self.logger.debug("Found audio stream end at EOF");
        } else {
            self.logger.debug(format!("Found audio stream end at offset {}", format_offset(end)));
        }
        Ok(end)
    }

    fn check_music_crc(&mut self, start: u64, end: u64, stored: u16) -> Stage<()> {
        let Some(len) = end.checked_sub(start) else {
            return Err(self.stop(
                Outcome::MusicMismatch,
                format!(
                    "Audio stream end {} precedes its start {}",
                    format_offset(end),
                    format_offset(start)
                ),
            ));
        };
        self.logger.debug(format!("Found audio stream length of {} bytes", len));

        let result = self
            .reader
            .seek(SeekFrom::Start(start))
            .and_then(|_| checksum::crc16_reader(&mut (&mut *self.reader).take(len)));

        let computed = match result {
            Ok((crc, read)) if read == len => crc,
            Ok((_, read)) => {
                return Err(self.stop(
                    Outcome::MusicMismatch,
                    format!("Audio stream truncated: read {} of {} bytes", read, len),
                ));
            }
            Err(e) => {
                return Err(self.stop(Outcome::MusicMismatch, format!("Failed to read audio stream: {}", e)));
            }
        };
        self.checksums.music_computed = Some(computed);

        if computed != stored {
            return Err(self.stop(
                Outcome::MusicMismatch,
                format!(
                    "Music CRC mismatch: computed {}, expected {}",
                    hex(Some(computed)),
                    hex(Some(stored))
                ),
            ));
        }

        self.logger.debug(format!("Computed music CRC: {:04X}", computed));
        Ok(())
    }
}
