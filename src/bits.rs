//! Fixed-width bit regrouping.
//!
//! Input bytes are treated as one big-endian bitstream. [`pack`] cuts that
//! stream into `width`-bit chunks and [`unpack`] glues chunks back into
//! bytes. Any bits left over at the end of the stream are zero padding on
//! the low-order side.

use crate::error::{PaperbackError, Result};

/// Widest chunk that fits in a `u64`
pub const MAX_WIDTH: usize = 64;

const BYTE_BITS: usize = 8;

fn check_width(width: usize) -> Result<()> {
    if width == 0 || width > MAX_WIDTH {
        return Err(PaperbackError::InvalidWidth(width));
    }
    Ok(())
}

#[inline]
fn low_mask(bits: usize) -> u128 {
    (1u128 << bits) - 1
}

/// Number of chunks `pack` produces for `len` bytes at `width`
pub fn chunk_count(len: usize, width: usize) -> Result<usize> {
    check_width(width)?;
    Ok((len * BYTE_BITS + width - 1) / width)
}

/// Regroup bytes into `width`-bit chunks (1..=64)
///
/// The final chunk is zero-padded on the low-order side when the bitstream
/// does not divide evenly.
pub fn pack(data: &[u8], width: usize) -> Result<Vec<u64>> {
    let mut chunks = Vec::with_capacity(chunk_count(data.len(), width)?);

    // At most width-1 bits are carried between bytes, so acc never exceeds 72 bits
    let mut acc: u128 = 0;
    let mut acc_bits = 0usize;

    for &byte in data {
        acc = (acc << BYTE_BITS) | u128::from(byte);
        acc_bits += BYTE_BITS;

        while acc_bits >= width {
            acc_bits -= width;
            chunks.push(((acc >> acc_bits) & low_mask(width)) as u64);
        }
        acc &= low_mask(acc_bits);
    }

    if acc_bits > 0 {
        chunks.push(((acc << (width - acc_bits)) & low_mask(width)) as u64);
    }

    Ok(chunks)
}

/// Regroup `width`-bit chunks back into bytes
///
/// Trailing bits that do not fill a whole byte are padding and must be zero.
/// For widths up to 8 the padding is always shorter than a byte, so
/// `unpack(pack(b, w), w) == b`. Wider chunks can hide whole zero bytes in
/// their padding; use [`unpack_exact`] when the byte length is known.
pub fn unpack(chunks: &[u64], width: usize) -> Result<Vec<u8>> {
    let (bytes, rest) = regroup(chunks, width)?;
    if rest != 0 {
        return Err(PaperbackError::InvalidChunk(
            "non-zero padding bits after final byte".into(),
        ));
    }
    Ok(bytes)
}

/// Regroup chunks into exactly `len` bytes, for any width in 1..=64
pub fn unpack_exact(chunks: &[u64], width: usize, len: usize) -> Result<Vec<u8>> {
    let expected = chunk_count(len, width)?;
    if chunks.len() != expected {
        return Err(PaperbackError::InvalidChunk(format!(
            "expected {} chunks for {} bytes at width {}, got {}",
            expected,
            len,
            width,
            chunks.len()
        )));
    }

    let (mut bytes, rest) = regroup(chunks, width)?;
    if rest != 0 || bytes[len..].iter().any(|&b| b != 0) {
        return Err(PaperbackError::InvalidChunk(
            "non-zero padding bits after final byte".into(),
        ));
    }
    bytes.truncate(len);
    Ok(bytes)
}

/// Shared decoder: whole bytes plus whatever sub-byte remainder is left
fn regroup(chunks: &[u64], width: usize) -> Result<(Vec<u8>, u128)> {
    check_width(width)?;
    let mut bytes = Vec::with_capacity(chunks.len() * width / BYTE_BITS);

    let mut acc: u128 = 0;
    let mut acc_bits = 0usize;

    for (idx, &chunk) in chunks.iter().enumerate() {
        let value = u128::from(chunk);
        if value > low_mask(width) {
            return Err(PaperbackError::InvalidChunk(format!(
                "chunk {} ({:#x}) does not fit in {} bits",
                idx, chunk, width
            )));
        }

        acc = (acc << width) | value;
        acc_bits += width;

        while acc_bits >= BYTE_BITS {
            acc_bits -= BYTE_BITS;
            bytes.push((acc >> acc_bits) as u8);
        }
        acc &= low_mask(acc_bits);
    }

    Ok((bytes, acc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_pads_low_bits() {
        // 11111111 -> 111 111 11(0)
        assert_eq!(pack(&[0xFF], 3).unwrap(), vec![7, 7, 6]);
        // 10110011 -> 1011 0011
        assert_eq!(pack(&[0xB3], 4).unwrap(), vec![0xB, 0x3]);
    }

    #[test]
    fn test_pack_is_big_endian() {
        let chunks = pack(&[0x12, 0x34, 0x56], 12).unwrap();
        assert_eq!(chunks, vec![0x123, 0x456]);

        let chunks = pack(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09], 64).unwrap();
        assert_eq!(chunks, vec![0x0102030405060708, 0x0900000000000000]);
    }

    #[test]
    fn test_pack_empty() {
        for width in 1..=MAX_WIDTH {
            assert!(pack(&[], width).unwrap().is_empty());
            assert!(unpack(&[], width).unwrap().is_empty());
        }
    }

    #[test]
    fn test_invalid_width() {
        assert!(matches!(pack(b"x", 0), Err(PaperbackError::InvalidWidth(0))));
        assert!(matches!(pack(b"x", 65), Err(PaperbackError::InvalidWidth(65))));
        assert!(matches!(unpack(&[1], 0), Err(PaperbackError::InvalidWidth(0))));
        assert!(matches!(
            unpack_exact(&[1], 99, 1),
            Err(PaperbackError::InvalidWidth(99))
        ));
    }

    #[test]
    fn test_unpack_rejects_oversized_chunk() {
        assert!(matches!(
            unpack(&[8, 0, 0], 3),
            Err(PaperbackError::InvalidChunk(_))
        ));
    }

    #[test]
    fn test_unpack_rejects_dirty_padding() {
        // [7, 7, 7] carries a set bit where pack would have put padding
        assert!(matches!(
            unpack(&[7, 7, 7], 3),
            Err(PaperbackError::InvalidChunk(_))
        ));
        assert_eq!(unpack(&[7, 7, 6], 3).unwrap(), vec![0xFF]);
    }

    #[test]
    fn test_unpack_exact_wide_chunks() {
        let data = [0xAB];
        let chunks = pack(&data, 16).unwrap();
        assert_eq!(chunks, vec![0xAB00]);
        // Plain unpack cannot tell [0xAB] from [0xAB, 0x00]
        assert_eq!(unpack(&chunks, 16).unwrap(), vec![0xAB, 0x00]);
        assert_eq!(unpack_exact(&chunks, 16, 1).unwrap(), vec![0xAB]);
    }

    #[test]
    fn test_unpack_exact_wrong_count() {
        assert!(matches!(
            unpack_exact(&[1, 2, 3], 8, 2),
            Err(PaperbackError::InvalidChunk(_))
        ));
    }

    #[test]
    fn test_chunk_count() {
        assert_eq!(chunk_count(0, 5).unwrap(), 0);
        assert_eq!(chunk_count(16, 5).unwrap(), 26);
        assert_eq!(chunk_count(32, 11).unwrap(), 24);
        assert_eq!(chunk_count(9, 64).unwrap(), 2);
    }
}
