use crate::error::{PaperbackError, Result};
use rand::{rngs::OsRng, RngCore};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Magic bytes for an encoded share
const SHARE_MAGIC: &[u8; 4] = b"PBSx";

/// Encoding version
const SHARE_VERSION: u8 = 1;

/// Identifies one sharing polynomial
///
/// Every share produced by one `split` call (and every share later grown
/// from them with `extend`) carries the same generation. Shares from
/// different generations lie on unrelated polynomials and cannot be combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Zeroize)]
pub struct Generation([u8; Generation::SIZE]);

impl Generation {
    pub const SIZE: usize = 8;

    /// Draw a fresh generation from the system CSPRNG
    pub fn random() -> Result<Self> {
        let mut bytes = [0u8; Self::SIZE];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| PaperbackError::RandomSourceFailed(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; Self::SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::SIZE] {
        &self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// One participant's points on the per-byte sharing polynomials
///
/// Layout when encoded:
/// `magic(4) | version(1) | generation(8) | threshold(1) | issued(1) | x(1) | len(4, LE) | ys(len)`
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Share {
    pub(crate) generation: Generation,
    pub(crate) threshold: u8,
    pub(crate) issued: u8,
    pub(crate) x: u8,
    pub(crate) ys: Vec<u8>,
}

impl Share {
    /// Fixed-size prefix before the y-values
    pub const HEADER_SIZE: usize = 4 + 1 + Generation::SIZE + 1 + 1 + 1 + 4;

    /// ShareIndex: the x-coordinate, never 0
    pub fn index(&self) -> u8 {
        self.x
    }

    /// Threshold k of the sharing this share belongs to
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// `n` of the split this share descends from
    ///
    /// Extended shares keep their parents' value and sit above it.
    pub fn issued(&self) -> u8 {
        self.issued
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Length of the shared secret in bytes
    pub fn secret_len(&self) -> usize {
        self.ys.len()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::HEADER_SIZE + self.ys.len());
        buf.extend_from_slice(SHARE_MAGIC);
        buf.push(SHARE_VERSION);
        buf.extend_from_slice(self.generation.as_bytes());
        buf.push(self.threshold);
        buf.push(self.issued);
        buf.push(self.x);
        buf.extend_from_slice(&(self.ys.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.ys);
        buf
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::HEADER_SIZE {
            return Err(PaperbackError::InvalidFormat("Share too short".into()));
        }
        if &data[0..4] != SHARE_MAGIC {
            return Err(PaperbackError::InvalidFormat("Invalid share magic bytes".into()));
        }
        if data[4] != SHARE_VERSION {
            return Err(PaperbackError::InvalidFormat(format!(
                "Unsupported share version {}",
                data[4]
            )));
        }

        let mut generation = [0u8; Generation::SIZE];
        generation.copy_from_slice(&data[5..5 + Generation::SIZE]);
        let rest = &data[5 + Generation::SIZE..];
        let (threshold, issued, x) = (rest[0], rest[1], rest[2]);

        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&rest[3..7]);
        let len = u32::from_le_bytes(len_bytes) as usize;
        let ys = &rest[7..];

        if ys.len() != len {
            return Err(PaperbackError::InvalidFormat(format!(
                "Share declares {} bytes but carries {}",
                len,
                ys.len()
            )));
        }
        if len == 0 {
            return Err(PaperbackError::InvalidFormat("Share has no y-values".into()));
        }
        if x == 0 {
            return Err(PaperbackError::InvalidFormat("Share index 0 is reserved".into()));
        }
        if threshold == 0 || threshold > issued {
            return Err(PaperbackError::InvalidFormat(format!(
                "Inconsistent share parameters: k={}, issued={}",
                threshold, issued
            )));
        }

        Ok(Self {
            generation: Generation::from_bytes(generation),
            threshold,
            issued,
            x,
            ys: ys.to_vec(),
        })
    }
}

impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Share")
            .field("generation", &self.generation)
            .field("threshold", &self.threshold)
            .field("issued", &self.issued)
            .field("x", &self.x)
            .field("len", &self.ys.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_share() -> Share {
        Share {
            generation: Generation::from_bytes([9; Generation::SIZE]),
            threshold: 3,
            issued: 6,
            x: 4,
            ys: vec![1, 2, 3, 4, 5],
        }
    }

    #[test]
    fn test_share_encoding_layout() {
        let bytes = test_share().to_bytes();
        assert_eq!(bytes.len(), Share::HEADER_SIZE + 5);
        assert_eq!(&bytes[0..4], SHARE_MAGIC);
        assert_eq!(Share::from_bytes(&bytes).unwrap(), test_share());
    }

    #[test]
    fn test_share_rejects_truncation() {
        let bytes = test_share().to_bytes();
        assert!(Share::from_bytes(&bytes[..bytes.len() - 1]).is_err());
        assert!(Share::from_bytes(&bytes[..10]).is_err());
    }

    #[test]
    fn test_share_rejects_zero_index() {
        let mut share = test_share();
        share.x = 0;
        assert!(matches!(
            Share::from_bytes(&share.to_bytes()),
            Err(PaperbackError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_share_above_issued_decodes() {
        let mut share = test_share();
        share.x = 200;
        assert_eq!(Share::from_bytes(&share.to_bytes()).unwrap().index(), 200);

        share.threshold = 7;
        assert!(matches!(
            Share::from_bytes(&share.to_bytes()),
            Err(PaperbackError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_share_rejects_bad_magic() {
        let mut bytes = test_share().to_bytes();
        bytes[0] ^= 0xFF;
        assert!(Share::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_debug_hides_values() {
        let rendered = format!("{:?}", test_share());
        assert!(rendered.contains("len: 5"));
        assert!(!rendered.contains("ys"));
    }
}
