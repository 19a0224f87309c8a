//! CRC-16 as written by LAME into the Info tag
//!
//! LAME stores two checksums in its tag: one over the first 190 bytes of the
//! Info frame (TagCRC) and one over the audio payload (MusicCRC). Both use the
//! plain CRC-16 (aka CRC-16/ARC): polynomial 0x8005, reflected, init 0, no
//! final xor.

use std::io::{self, Read};

const CRC16: crc::Crc<u16, crc::Table<16>> = crc::Crc::<u16, crc::Table<16>>::new(&crc::CRC_16_ARC);

/// Compute the CRC-16 of a byte slice
pub fn crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

/// Compute the CRC-16 of everything a reader yields.
///
/// Returns the checksum and the number of bytes consumed.
pub fn crc16_reader<R: Read>(reader: &mut R) -> io::Result<(u16, u64)> {
    let mut digest = CRC16.digest();
    let mut buf = vec![0u8; 64 * 1024];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        digest.update(&buf[..n]);
        total += n as u64;
    }

    Ok((digest.finalize(), total))
}
