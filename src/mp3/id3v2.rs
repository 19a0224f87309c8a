//! ID3v2 header parsing
//!
//! An ID3v2 tag may precede the first audio frame. Its 10-byte header is:
//!
//! ```text
//! "ID3" | major | revision | flags | size (4 bytes, 7 bits per byte)
//! ```
//!
//! The size excludes the header itself, so the tag occupies `10 + size` bytes.

use thiserror::Error;

pub const MAGIC: &[u8; 3] = b"ID3";
pub const HEADER_LEN: usize = 10;

/// ID3v2 never uses 0xFF in either version byte
pub const REVISION_MAX: u8 = 0xFE;

pub const FLAG_EXTENDED: u8 = 0x40;
pub const FLAG_FOOTER: u8 = 0x10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("need 10 bytes for an ID3v2 header, have {0}")]
    Truncated(usize),
    #[error("bad ID3v2 identifier {0:02X?}")]
    BadMagic([u8; 3]),
    #[error("bad ID3v2 revision 0x{0:02X}")]
    BadRevision(u8),
}

/// A parsed ID3v2 header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadingTag {
    pub major: u8,
    pub revision: u8,
    pub flags: u8,
    /// Tag body length, header excluded
    pub size: u32,
}

impl LeadingTag {
    /// Parse the header at the start of `data`
    pub fn parse(data: &[u8]) -> Result<Self, TagError> {
        if data.len() < HEADER_LEN {
            return Err(TagError::Truncated(data.len()));
        }

        if &data[..3] != MAGIC {
            return Err(TagError::BadMagic([data[0], data[1], data[2]]));
        }

        let revision = data[4];
        if revision > REVISION_MAX {
            return Err(TagError::BadRevision(revision));
        }

        Ok(LeadingTag {
            major: data[3],
            revision,
            flags: data[5],
            size: unpad_integer(&data[6..10], 7) as u32,
        })
    }

    /// Bytes from the start of the header to the end of the tag body
    pub fn total_len(&self) -> u64 {
        HEADER_LEN as u64 + self.size as u64
    }

    pub fn has_extended_header(&self) -> bool {
        self.flags & FLAG_EXTENDED != 0
    }

    pub fn has_footer(&self) -> bool {
        self.flags & FLAG_FOOTER != 0
    }
}

/// Decode a bit-padded big-endian integer.
///
/// Only the low `bits` bits of each byte carry payload. ID3v2 sizes use
/// 7 bits per byte so that no byte of the size can look like a frame sync.
pub fn unpad_integer(data: &[u8], bits: u32) -> u64 {
    let mask = (1u64 << bits) - 1;
    data.iter()
        .fold(0u64, |acc, &b| (acc << bits) | (b as u64 & mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ==========================================================================
    // BIT-PADDED INTEGERS
    // ==========================================================================
    //
    // ID3v2 "syncsafe" sizes spread 28 bits over 4 bytes, 7 bits each:
    //
    //   0x00 0x00 0x02 0x01  →  (2 << 7) | 1 = 257
    //
    // The high bit of each byte is always 0 in a well-formed tag, and is
    // ignored when decoding.
    // ==========================================================================

    /// Reference encoder used to check the decoder
    fn pad_integer(mut value: u64, width: usize, bits: u32) -> Vec<u8> {
        let mask = (1u64 << bits) - 1;
        let mut out = vec![0u8; width];
        for byte in out.iter_mut().rev() {
            *byte = (value & mask) as u8;
            value >>= bits;
        }
        out
    }

    #[test]
    fn test_unpad_known_values() {
        assert_eq!(unpad_integer(&[0x00, 0x00, 0x02, 0x01], 7), 257);
        assert_eq!(unpad_integer(&[0x7F, 0x7F, 0x7F, 0x7F], 7), (1 << 28) - 1);
        assert_eq!(unpad_integer(&[0x00, 0x00, 0x00, 0x7F], 7), 127);
        assert_eq!(unpad_integer(&[0x00, 0x00, 0x01, 0x00], 7), 128);
    }

    #[test]
    fn test_unpad_ignores_padding_bit() {
        assert_eq!(unpad_integer(&[0x80, 0x80, 0x82, 0x81], 7), 257);
    }

    #[test]
    fn test_unpad_empty_is_zero() {
        assert_eq!(unpad_integer(&[], 7), 0);
    }

    #[test]
    fn test_unpad_eight_bits_is_plain_big_endian() {
        assert_eq!(unpad_integer(&[0x12, 0x34, 0x56, 0x78], 8), 0x1234_5678);
    }

    proptest! {
        #[test]
        fn prop_unpad_inverts_padding(value in 0u64..(1 << 28)) {
            let padded = pad_integer(value, 4, 7);
            prop_assert!(padded.iter().all(|b| b & 0x80 == 0));
            prop_assert_eq!(unpad_integer(&padded, 7), value);
        }
    }

    // ==========================================================================
    // HEADER PARSING
    // ==========================================================================

    fn header(major: u8, revision: u8, flags: u8, size: u32) -> Vec<u8> {
        let mut data = MAGIC.to_vec();
        data.extend([major, revision, flags]);
        data.extend(pad_integer(size as u64, 4, 7));
        data
    }

    #[test]
    fn test_parse_v24_header() {
        let tag = LeadingTag::parse(&header(4, 0, 0, 4096)).expect("Should parse");
        assert_eq!(tag.major, 4);
        assert_eq!(tag.revision, 0);
        assert_eq!(tag.size, 4096);
        assert_eq!(tag.total_len(), 4106);
        assert!(!tag.has_extended_header());
    }

    #[test]
    fn test_parse_flags() {
        let tag = LeadingTag::parse(&header(3, 0, FLAG_EXTENDED | FLAG_FOOTER, 0)).expect("Should parse");
        assert!(tag.has_extended_header());
        assert!(tag.has_footer());
    }

    #[test]
    fn test_parse_truncated() {
        assert_eq!(LeadingTag::parse(b"ID3\x04\x00"), Err(TagError::Truncated(5)));
        assert_eq!(LeadingTag::parse(&[]), Err(TagError::Truncated(0)));
    }

    #[test]
    fn test_parse_bad_magic() {
        let mut data = header(4, 0, 0, 10);
        data[0] = b'X';
        assert!(matches!(LeadingTag::parse(&data), Err(TagError::BadMagic(_))));
    }

    #[test]
    fn test_parse_bad_revision() {
        assert_eq!(
            LeadingTag::parse(&header(4, 0xFF, 0, 10)),
            Err(TagError::BadRevision(0xFF))
        );
    }
}
