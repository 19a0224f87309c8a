//! Xing/Info + LAME tag extraction
//!
//! LAME writes a fixed-layout tag into the first frame of the stream. The
//! frame header and side information come first, then the Xing/Info block,
//! then the LAME extension. All multi-byte fields are big-endian.
//!
//! ```text
//! offset  size  field
//! 0       36    frame header + side info (21 for mono streams)
//! 36      4     "Xing" (VBR) or "Info" (CBR)
//! 40      116   frames, bytes, TOC, quality
//! 156     9     encoder version, e.g. "LAME3.100"
//! 165     23    LAME data (lowpass, replay gain, flags, delays, ...)
//! 188     2     MusicCRC
//! 190     2     TagCRC, CRC-16 of bytes 0..190
//! ```
//!
//! The side information is 32 bytes for stereo MPEG-1 and 17 bytes for mono,
//! which is why two layouts exist.

use thiserror::Error;

pub const XING_MAGIC: &[u8; 4] = b"Xing";
pub const INFO_MAGIC: &[u8; 4] = b"Info";
pub const LAME_MAGIC: &[u8; 4] = b"LAME";

/// Encoders before LAME 3.90 did not write a usable MusicCRC
pub const MIN_CRC_VERSION: LameVersion = LameVersion { major: 3, minor: 90 };

const INFO_DATA_LEN: usize = 116;
const VERSION_LEN: usize = 9;
const LAME_DATA_LEN: usize = 23;

/// Which side-information size the tag was found after
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// 4-byte header + 32 bytes of side info
    Stereo,
    /// 4-byte header + 17 bytes of side info
    Mono,
}

impl Layout {
    pub fn prefix_len(self) -> usize {
        match self {
            Layout::Stereo => 36,
            Layout::Mono => 21,
        }
    }

    /// Bytes from the frame start through the TagCRC field
    pub fn size(self) -> usize {
        self.prefix_len() + 4 + INFO_DATA_LEN + VERSION_LEN + LAME_DATA_LEN + 2 + 2
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InfoError {
    #[error("only {0} bytes after the frame header")]
    Truncated(usize),
    #[error("no Xing/Info tag after the frame header")]
    MissingTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LameVersion {
    pub major: u32,
    pub minor: u32,
}

impl std::fmt::Display for LameVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// What the 9-byte encoder field says about the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoder {
    Lame(LameVersion),
    /// Starts with "LAME" but the version was mangled
    LameUnknownVersion,
    /// Some other encoder (or scene-group graffiti)
    Other,
}

/// The Xing/Info tag of the first frame
#[derive(Debug, Clone)]
pub struct InfoTag {
    pub layout: Layout,
    /// True for "Xing" (VBR), false for "Info" (CBR)
    pub is_vbr: bool,
    pub encoder_tag: [u8; VERSION_LEN],
    pub music_crc: u16,
    pub tag_crc: u16,
}

impl InfoTag {
    /// Parse the tag from bytes starting at the first frame header.
    ///
    /// The stereo layout is tried first; the mono one only if the stereo
    /// position does not hold a Xing/Info magic.
    pub fn parse(frame: &[u8]) -> Result<Self, InfoError> {
        if frame.len() < Layout::Mono.size() {
            return Err(InfoError::Truncated(frame.len()));
        }

        [Layout::Stereo, Layout::Mono]
            .into_iter()
            .find_map(|layout| Self::parse_layout(frame, layout))
            .ok_or(InfoError::MissingTag)
    }

    fn parse_layout(frame: &[u8], layout: Layout) -> Option<Self> {
        let segment = frame.get(..layout.size())?;
        let mut pos = layout.prefix_len();

        let magic = &segment[pos..pos + 4];
        let is_vbr = match magic {
            m if m == XING_MAGIC => true,
            m if m == INFO_MAGIC => false,
            _ => return None,
        };
        pos += 4 + INFO_DATA_LEN;

        let mut encoder_tag = [0u8; VERSION_LEN];
        encoder_tag.copy_from_slice(&segment[pos..pos + VERSION_LEN]);
        pos += VERSION_LEN + LAME_DATA_LEN;

        let music_crc = u16::from_be_bytes([segment[pos], segment[pos + 1]]);
        let tag_crc = u16::from_be_bytes([segment[pos + 2], segment[pos + 3]]);

        Some(InfoTag {
            layout,
            is_vbr,
            encoder_tag,
            music_crc,
            tag_crc,
        })
    }

    /// Length of the tag from the frame start, TagCRC included
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    /// Number of leading frame bytes covered by the TagCRC
    pub fn crc_span(&self) -> usize {
        self.size() - 2
    }

    pub fn magic(&self) -> &'static str {
        if self.is_vbr {
            "Xing"
        } else {
            "Info"
        }
    }

    pub fn encoder(&self) -> Encoder {
        if &self.encoder_tag[..4] != LAME_MAGIC {
            return Encoder::Other;
        }
        match parse_version(&self.encoder_tag[4..]) {
            Some(version) => Encoder::Lame(version),
            None => Encoder::LameUnknownVersion,
        }
    }

    /// Encoder field as printable text, for diagnostics
    pub fn encoder_text(&self) -> String {
        String::from_utf8_lossy(&self.encoder_tag)
            .trim_end_matches('\0')
            .to_string()
    }
}

/// Parse the "3.99r" / "3.100" part of a LAME version field.
///
/// Only the leading `major.minor` digits count; whatever follows (release
/// letters, NULs, spaces) is ignored.
pub fn parse_version(raw: &[u8]) -> Option<LameVersion> {
    let text = std::str::from_utf8(raw).ok()?;
    let (major, rest) = text.split_once('.')?;
    let minor: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();

    if major.is_empty() || !major.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(LameVersion {
        major: major.parse().ok()?,
        minor: minor.parse().ok()?,
    })
}
