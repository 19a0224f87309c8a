//! MP3 container structures: the headers and tags surrounding the audio

pub mod frame;
pub mod id3v2;
pub mod lame;
pub mod trailer;

pub use frame::{ChannelMode, FrameHeader, Layer, MpegVersion};
pub use id3v2::LeadingTag;
pub use lame::{Encoder, InfoTag, LameVersion, Layout};
pub use trailer::TrailingTags;
