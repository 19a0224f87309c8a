//! Trailing tag detection
//!
//! Tags appended after the audio are not covered by the MusicCRC, so the
//! audio payload ends where the first of them starts. A tagged file is
//! generally laid out like this:
//!
//! ```text
//! [ID3v2][Info frame][audio ...][Lyrics3v2][APEv2][ID3v1]
//! ```
//!
//! All trailing tags are assumed to fit into the last 512 KiB of the file.

use std::io::{self, Read, Seek, SeekFrom};

pub const LYRICS3_MAGIC: &[u8] = b"LYRICSBEGIN";
pub const APE_MAGIC: &[u8] = b"APETAGEX";
pub const ID3V1_MAGIC: &[u8] = b"TAG";

pub const ID3V1_LEN: u64 = 128;

/// How much of the file end is searched for Lyrics3 and APE tags
pub const TAIL_WINDOW: u64 = 512 * 1024;

/// Absolute offsets of the trailing tags that were found
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrailingTags {
    pub lyrics3: Option<u64>,
    pub ape: Option<u64>,
    pub id3v1: Option<u64>,
    pub file_len: u64,
}

impl TrailingTags {
    /// Where the audio payload ends: the earliest trailing tag, or EOF
    pub fn audio_end(&self) -> u64 {
        [self.lyrics3, self.ape, self.id3v1]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(self.file_len)
    }

    pub fn is_empty(&self) -> bool {
        self.lyrics3.is_none() && self.ape.is_none() && self.id3v1.is_none()
    }

    /// Locate trailing tags in a reader
    pub fn scan<R: Read + Seek>(reader: &mut R) -> io::Result<Self> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        let tail_start = file_len.saturating_sub(TAIL_WINDOW);

        reader.seek(SeekFrom::Start(tail_start))?;
        let mut tail = Vec::with_capacity((file_len - tail_start) as usize);
        reader.read_to_end(&mut tail)?;

        Ok(Self::from_tail(&tail, tail_start))
    }

    /// Locate trailing tags in the final bytes of a file.
    ///
    /// `tail_start` is the absolute offset of `tail[0]`; `tail` must run to EOF.
    pub fn from_tail(tail: &[u8], tail_start: u64) -> Self {
        let file_len = tail_start + tail.len() as u64;

        TrailingTags {
            lyrics3: find_pattern(tail, LYRICS3_MAGIC).map(|pos| tail_start + pos as u64),
            ape: find_pattern(tail, APE_MAGIC).map(|pos| tail_start + pos as u64),
            id3v1: find_id3v1(tail).map(|from_end| file_len - from_end),
            file_len,
        }
    }
}

/// Check for an ID3v1 tag 256 or 128 bytes before EOF.
///
/// Some taggers duplicate the ID3v1 block, so a "TAG" at 256 bytes from the
/// end is preferred over one at 128. A candidate is rejected if an APE
/// preamble starts three bytes before it. This is an empirical rule, not
/// something every encoder is guaranteed to follow.
///
/// Returns the distance of the tag from EOF.
fn find_id3v1(tail: &[u8]) -> Option<u64> {
    [2 * ID3V1_LEN, ID3V1_LEN]
        .into_iter()
        .find(|&from_end| id3v1_at(tail, from_end))
}

fn id3v1_at(tail: &[u8], from_end: u64) -> bool {
    let Some(pos) = tail.len().checked_sub(from_end as usize) else {
        return false;
    };

    let is_tag = tail.get(pos..pos + ID3V1_MAGIC.len()) == Some(ID3V1_MAGIC);
    let is_ape = pos
        .checked_sub(3)
        .and_then(|start| tail.get(start..start + APE_MAGIC.len()))
        == Some(APE_MAGIC);

    is_tag && !is_ape
}

/// Find a byte pattern in a slice
pub fn find_pattern(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    // ==========================================================================
    // BACKGROUND: trailing tags
    // ==========================================================================
    //
    // - Lyrics3v2 starts with "LYRICSBEGIN" and sits before any ID3v1 tag
    // - APEv2 has a 32-byte header and/or footer starting with "APETAGEX"
    // - ID3v1 is exactly 128 bytes, starting with "TAG", at the very end
    //
    // The audio payload runs up to whichever of these starts first.
    // ==========================================================================

    fn id3v1_block() -> Vec<u8> {
        let mut tag = b"TAG".to_vec();
        tag.resize(ID3V1_LEN as usize, b' ');
        tag
    }

    #[test]
    fn test_no_tags_ends_at_eof() {
        let tail = vec![0x55u8; 1000];
        let tags = TrailingTags::from_tail(&tail, 0);
        assert!(tags.is_empty());
        assert_eq!(tags.audio_end(), 1000);
    }

    #[test]
    fn test_id3v1_at_128() {
        let mut data = vec![0x55u8; 1000];
        data.extend(id3v1_block());

        let tags = TrailingTags::from_tail(&data, 0);
        assert_eq!(tags.id3v1, Some(1000));
        assert_eq!(tags.audio_end(), 1000);
    }

    #[test]
    fn test_duplicated_id3v1_prefers_256() {
        let mut data = vec![0x55u8; 1000];
        data.extend(id3v1_block());
        data.extend(id3v1_block());

        let tags = TrailingTags::from_tail(&data, 0);
        assert_eq!(tags.id3v1, Some(1000), "Should use the 256-byte occurrence");
        assert_eq!(tags.audio_end(), 1000);
    }

    #[test]
    fn test_id3v1_rejected_after_ape_preamble() {
        // "APETAGEX" starting 3 bytes before the "TAG" at -128
        let mut data = vec![0x55u8; 1000];
        let tag_pos = data.len() - 3;
        data[tag_pos..].copy_from_slice(b"APE");
        let mut block = id3v1_block();
        block[3..5].copy_from_slice(b"EX");
        data.extend(block);

        let tags = TrailingTags::from_tail(&data, 0);
        assert_eq!(tags.id3v1, None);
        // The APE preamble itself still counts as a trailing tag
        assert_eq!(tags.ape, Some(997));
    }

    #[test]
    fn test_ape_and_lyrics_take_minimum() {
        let mut data = vec![0x55u8; 500];
        data.extend_from_slice(LYRICS3_MAGIC);
        data.extend(vec![b'x'; 50]);
        data.extend_from_slice(APE_MAGIC);
        data.extend(vec![0u8; 24]);
        data.extend(id3v1_block());

        let tags = TrailingTags::from_tail(&data, 0);
        assert_eq!(tags.lyrics3, Some(500));
        assert_eq!(tags.ape, Some(561));
        assert_eq!(tags.id3v1, Some(data.len() as u64 - 128));
        assert_eq!(tags.audio_end(), 500);
    }

    #[test]
    fn test_offsets_are_absolute() {
        let mut tail = vec![0x55u8; 100];
        tail.extend_from_slice(APE_MAGIC);
        tail.extend(vec![0u8; 24]);

        let tags = TrailingTags::from_tail(&tail, 10_000);
        assert_eq!(tags.ape, Some(10_100));
        assert_eq!(tags.file_len, 10_132);
    }

    #[test]
    fn test_file_shorter_than_id3v1() {
        // "TAG" at the very start of a 100-byte file is not at either position
        let mut data = b"TAG".to_vec();
        data.resize(100, 0);
        let tags = TrailingTags::from_tail(&data, 0);
        assert_eq!(tags.id3v1, None);

        // Exactly 128 bytes: the tag is the whole file
        let tags = TrailingTags::from_tail(&id3v1_block(), 0);
        assert_eq!(tags.id3v1, Some(0));
    }

    #[test]
    fn test_scan_reads_only_the_tail() {
        // APE magic placed before the 512 KiB window must not be seen
        let mut data = APE_MAGIC.to_vec();
        data.resize(TAIL_WINDOW as usize + 4096, 0x55);
        data.extend(id3v1_block());

        let mut cursor = Cursor::new(data.clone());
        let tags = TrailingTags::scan(&mut cursor).expect("scan");
        assert_eq!(tags.ape, None);
        assert_eq!(tags.id3v1, Some(data.len() as u64 - 128));
        assert_eq!(tags.file_len, data.len() as u64);
    }

    #[test]
    fn test_scan_short_file_reads_everything() {
        let mut data = vec![0x55u8; 300];
        data.extend_from_slice(LYRICS3_MAGIC);
        let mut cursor = Cursor::new(data);
        let tags = TrailingTags::scan(&mut cursor).expect("scan");
        assert_eq!(tags.lyrics3, Some(300));
    }

    #[test]
    fn test_find_pattern() {
        assert_eq!(find_pattern(b"hello LAME3.100 world", b"LAME"), Some(6));
        assert_eq!(find_pattern(b"hello world", b"LAME"), None);
        assert_eq!(find_pattern(b"LA", b"LAME"), None);
    }
}
