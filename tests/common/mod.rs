//! Synthetic MP3 files for integration tests
//!
//! Files are laid out as:
//!
//! ```text
//! [ID3v2 tags][Info frame, 417 bytes][audio frames][trailing bytes]
//! ```
//!
//! The audio bytes stay below 0x80 outside the frame headers, so no false
//! frame sync or tag magic can appear inside them.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

pub const FRAME_LEN: usize = 417;
pub const STEREO_PREFIX: usize = 36;
pub const MONO_PREFIX: usize = 21;

const CRC16: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_ARC);

pub fn crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

#[derive(Debug, Clone)]
pub struct Mp3Builder {
    leading: Vec<Vec<u8>>,
    mono: bool,
    magic: [u8; 4],
    version: [u8; 9],
    frames: usize,
    trailer: Vec<u8>,
    zero_crcs: bool,
}

impl Default for Mp3Builder {
    fn default() -> Self {
        Self {
            leading: Vec::new(),
            mono: false,
            magic: *b"Info",
            version: *b"LAME3.100",
            frames: 8,
            trailer: Vec::new(),
            zero_crcs: false,
        }
    }
}

impl Mp3Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend an ID3v2.4 tag with a `body`-byte payload
    pub fn id3v2(mut self, body: usize) -> Self {
        self.leading.push(id3v2_tag(body));
        self
    }

    pub fn raw_leading(mut self, bytes: Vec<u8>) -> Self {
        self.leading.push(bytes);
        self
    }

    pub fn mono(mut self) -> Self {
        self.mono = true;
        self
    }

    pub fn xing(mut self) -> Self {
        self.magic = *b"Xing";
        self
    }

    pub fn version(mut self, version: &[u8; 9]) -> Self {
        self.version = *version;
        self
    }

    pub fn frames(mut self, frames: usize) -> Self {
        self.frames = frames;
        self
    }

    pub fn trailer(mut self, bytes: &[u8]) -> Self {
        self.trailer.extend_from_slice(bytes);
        self
    }

    pub fn zero_crcs(mut self) -> Self {
        self.zero_crcs = true;
        self
    }

    pub fn prefix_len(&self) -> usize {
        if self.mono {
            MONO_PREFIX
        } else {
            STEREO_PREFIX
        }
    }

    /// Offset of the Info frame in the built file
    pub fn frame_offset(&self) -> usize {
        self.leading.iter().map(Vec::len).sum()
    }

    /// Offset of the first audio frame in the built file
    pub fn audio_offset(&self) -> usize {
        self.frame_offset() + FRAME_LEN
    }

    pub fn audio(&self) -> Vec<u8> {
        let mut audio = Vec::with_capacity(self.frames * FRAME_LEN);
        for i in 0..self.frames {
            audio.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
            audio.extend((0..FRAME_LEN - 4).map(|j| ((j * 7 + i * 3) % 128) as u8));
        }
        audio
    }

    pub fn build(&self) -> Vec<u8> {
        let audio = self.audio();

        let mut frame = vec![0xFF, 0xFB, 0x90, if self.mono { 0xC0 } else { 0x00 }];
        frame.resize(self.prefix_len(), 0);
        frame.extend_from_slice(&self.magic);
        frame.extend_from_slice(&[0u8; 116]);
        frame.extend_from_slice(&self.version);
        frame.extend_from_slice(&[0u8; 23]);

        let music_crc = if self.zero_crcs { 0 } else { crc16(&audio) };
        frame.extend_from_slice(&music_crc.to_be_bytes());
        let tag_crc = if self.zero_crcs { 0 } else { crc16(&frame) };
        frame.extend_from_slice(&tag_crc.to_be_bytes());
        frame.resize(FRAME_LEN, 0);

        let mut file: Vec<u8> = self.leading.concat();
        file.extend(frame);
        file.extend(audio);
        file.extend_from_slice(&self.trailer);
        file
    }

    /// Write the file into `dir` and return its path
    pub fn write_to(&self, dir: &tempfile::TempDir, name: &str) -> PathBuf {
        write_file(dir, name, &self.build())
    }
}

pub fn id3v2_tag(body: usize) -> Vec<u8> {
    let size = body as u32;
    let mut tag = b"ID3\x04\x00\x00".to_vec();
    tag.extend_from_slice(&[
        ((size >> 21) & 0x7F) as u8,
        ((size >> 14) & 0x7F) as u8,
        ((size >> 7) & 0x7F) as u8,
        (size & 0x7F) as u8,
    ]);
    tag.resize(10 + body, 0);
    tag
}

pub fn id3v1_tag() -> Vec<u8> {
    let mut tag = b"TAG".to_vec();
    tag.extend_from_slice(b"Title");
    tag.resize(128, b' ');
    tag
}

pub fn write_file(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create test file");
    file.write_all(data).expect("write test file");
    path
}
