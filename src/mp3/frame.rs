//! MP3 frame sync location and header decoding
//!
//! Every frame opens with a 4-byte header whose first 11 bits are set:
//!
//! ```text
//! byte 0   1111 1111   sync
//! byte 1   111V VLLP   sync, version (VV), layer (LL), no-CRC bit (P)
//! byte 2   BBBB SSXx   bitrate index, sample-rate index, padding, private
//! byte 3   MMxx xxxx   channel mode, then mode extension and flags
//! ```
//!
//! LAME only writes its Info tag into MPEG-1 Layer III streams, so the
//! locator looks for exactly the two sync words of that combination. Full
//! header decoding is only used to describe frames in debug output.

use std::fmt;

/// MPEG-1 Layer III, CRC protected
pub const SYNC_PROTECTED: [u8; 2] = [0xFF, 0xFA];
/// MPEG-1 Layer III, unprotected
pub const SYNC_UNPROTECTED: [u8; 2] = [0xFF, 0xFB];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    Mpeg1,
    Mpeg2,
    Mpeg25,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Layer1,
    Layer2,
    Layer3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Stereo,
    JointStereo,
    DualChannel,
    Mono,
}

/// A decoded frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: MpegVersion,
    pub layer: Layer,
    /// A 16-bit CRC follows the header
    pub protected: bool,
    /// kbps
    pub bitrate: u32,
    /// Hz
    pub sample_rate: u32,
    pub padding: bool,
    pub channel_mode: ChannelMode,
}

/// kbps by bitrate index 1..=14, per (version, layer) family.
/// Index 0 (free format) and 15 (bad) are rejected before lookup.
const BITRATES: [[u32; 14]; 5] = [
    // MPEG-1 Layer I
    [32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448],
    // MPEG-1 Layer II
    [32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384],
    // MPEG-1 Layer III
    [32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320],
    // MPEG-2/2.5 Layer I
    [32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256],
    // MPEG-2/2.5 Layer II and III
    [8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160],
];

impl MpegVersion {
    fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b00 => Some(MpegVersion::Mpeg25),
            0b10 => Some(MpegVersion::Mpeg2),
            0b11 => Some(MpegVersion::Mpeg1),
            _ => None,
        }
    }

    /// Sample rates for sample-rate indices 0..=2
    fn sample_rates(self) -> [u32; 3] {
        match self {
            MpegVersion::Mpeg1 => [44100, 48000, 32000],
            MpegVersion::Mpeg2 => [22050, 24000, 16000],
            MpegVersion::Mpeg25 => [11025, 12000, 8000],
        }
    }
}

impl Layer {
    fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b01 => Some(Layer::Layer3),
            0b10 => Some(Layer::Layer2),
            0b11 => Some(Layer::Layer1),
            _ => None,
        }
    }
}

impl ChannelMode {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => ChannelMode::Stereo,
            0b01 => ChannelMode::JointStereo,
            0b10 => ChannelMode::DualChannel,
            _ => ChannelMode::Mono,
        }
    }
}

impl FrameHeader {
    /// Decode a 4-byte header; `None` unless every field is valid
    pub fn parse(header: [u8; 4]) -> Option<Self> {
        let [b0, b1, b2, b3] = header;
        if b0 != 0xFF || b1 & 0xE0 != 0xE0 {
            return None;
        }

        let version = MpegVersion::from_bits((b1 >> 3) & 0b11)?;
        let layer = Layer::from_bits((b1 >> 1) & 0b11)?;

        let family = match (version, layer) {
            (MpegVersion::Mpeg1, Layer::Layer1) => 0,
            (MpegVersion::Mpeg1, Layer::Layer2) => 1,
            (MpegVersion::Mpeg1, Layer::Layer3) => 2,
            (_, Layer::Layer1) => 3,
            _ => 4,
        };
        let bitrate_index = usize::from(b2 >> 4);
        let bitrate = *BITRATES[family].get(bitrate_index.checked_sub(1)?)?;
        let sample_rate = *version.sample_rates().get(usize::from((b2 >> 2) & 0b11))?;

        Some(FrameHeader {
            version,
            layer,
            protected: b1 & 0x01 == 0,
            bitrate,
            sample_rate,
            padding: b2 & 0x02 != 0,
            channel_mode: ChannelMode::from_bits(b3 >> 6),
        })
    }
}

impl fmt::Display for FrameHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = match self.version {
            MpegVersion::Mpeg1 => "MPEG-1",
            MpegVersion::Mpeg2 => "MPEG-2",
            MpegVersion::Mpeg25 => "MPEG-2.5",
        };
        let layer = match self.layer {
            Layer::Layer1 => "I",
            Layer::Layer2 => "II",
            Layer::Layer3 => "III",
        };
        let mode = match self.channel_mode {
            ChannelMode::Stereo => "stereo",
            ChannelMode::JointStereo => "joint stereo",
            ChannelMode::DualChannel => "dual channel",
            ChannelMode::Mono => "mono",
        };
        write!(
            f,
            "{} Layer {}, {} kbps, {} Hz, {}{}",
            version,
            layer,
            self.bitrate,
            self.sample_rate,
            mode,
            if self.protected { ", CRC" } else { "" }
        )
    }
}

/// Find the first MPEG-1 Layer III sync word in `buffer`.
///
/// Only the two sync bytes are matched; the rest of the header is not
/// validated. When both variants occur the lowest index wins.
pub fn find_frame(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(2)
        .position(|w| w == SYNC_PROTECTED || w == SYNC_UNPROTECTED)
}

/// Describe the 4 bytes at `pos` for diagnostics
pub fn describe(buffer: &[u8], pos: usize) -> String {
    let Some(bytes) = buffer.get(pos..pos + 4) else {
        return "truncated header".to_string();
    };
    let header = [bytes[0], bytes[1], bytes[2], bytes[3]];

    match FrameHeader::parse(header) {
        Some(frame) => format!("{:02X?}: {}", header, frame),
        None => format!("{:02X?}: not a valid header", header),
    }
}
