//! Random secrets: the master passphrase and per-shard codewords.
//!
//! Codewords are written down by hand, so they have a text form (see
//! [`encode_text`]): the raw bytes regrouped into 5-bit symbols over the
//! z-base-32 alphabet, in dash-separated groups of four, followed by a
//! four-symbol checksum group (the first two bytes of SHA-256 over the raw
//! bytes).

use crate::bits;
use crate::error::{PaperbackError, Result};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

const ALPHABET: &[u8; 32] = b"ybndrfg8ejkmcpqxot1uwisza345h769";
const SYMBOL_BITS: usize = 5;
const GROUP_SIZE: usize = 4;
const CHECKSUM_BYTES: usize = 2;
/// Symbols needed for the checksum bytes
const CHECKSUM_SYMBOLS: usize = (CHECKSUM_BYTES * 8 + SYMBOL_BITS - 1) / SYMBOL_BITS;

fn random_bytes(len: usize) -> Result<Zeroizing<Vec<u8>>> {
    let mut bytes = Zeroizing::new(vec![0u8; len]);
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| PaperbackError::RandomSourceFailed(e.to_string()))?;
    Ok(bytes)
}

/// Key material for the master document
#[derive(Clone, PartialEq, Eq)]
pub struct Passphrase(Zeroizing<Vec<u8>>);

impl Passphrase {
    /// Generate `len` random bytes from the system CSPRNG
    pub fn generate(len: usize) -> Result<Self> {
        Ok(Self(random_bytes(len)?))
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(Zeroizing::new(bytes.to_vec()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Passphrase(<{} bytes redacted>)", self.0.len())
    }
}

/// Secret that unlocks exactly one shard
#[derive(Clone, PartialEq, Eq)]
pub struct Codeword(Zeroizing<Vec<u8>>);

impl Codeword {
    /// Generate `len` random bytes from the system CSPRNG
    pub fn generate(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(PaperbackError::InvalidCodeword("empty codeword".into()));
        }
        Ok(Self(random_bytes(len)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Codeword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_text(&self.0))
    }
}

impl FromStr for Codeword {
    type Err = PaperbackError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(decode_text(s)?))
    }
}

fn checksum(bytes: &[u8]) -> [u8; CHECKSUM_BYTES] {
    let digest = Sha256::digest(bytes);
    let mut out = [0u8; CHECKSUM_BYTES];
    out.copy_from_slice(&digest[..CHECKSUM_BYTES]);
    out
}

/// Render bytes as checksummed z-base-32 groups
pub fn encode_text(bytes: &[u8]) -> Zeroizing<String> {
    // Width 5 is always valid, so pack cannot fail here
    let data = Zeroizing::new(bits::pack(bytes, SYMBOL_BITS).unwrap_or_default());
    let check = bits::pack(&checksum(bytes), SYMBOL_BITS).unwrap_or_default();

    // Exact capacity: the buffer must not reallocate
    let separators = data.len().div_ceil(GROUP_SIZE);
    let mut text = Zeroizing::new(String::with_capacity(data.len() + check.len() + separators));
    for group in data.chunks(GROUP_SIZE).chain(std::iter::once(&check[..])) {
        if !text.is_empty() {
            text.push('-');
        }
        text.extend(group.iter().map(|&s| ALPHABET[s as usize] as char));
    }
    text
}

/// Parse text produced by [`encode_text`]
///
/// Case-insensitive; dashes and whitespace are ignored. Fails with
/// `InvalidCodeword` on unknown symbols or a checksum mismatch.
pub fn decode_text(text: &str) -> Result<Zeroizing<Vec<u8>>> {
    let mut symbols = Zeroizing::new(Vec::with_capacity(text.len()));
    for ch in text.chars().filter(|c| *c != '-' && !c.is_whitespace()) {
        let lower = ch.to_ascii_lowercase();
        let pos = ALPHABET
            .iter()
            .position(|&a| a as char == lower)
            .ok_or_else(|| PaperbackError::InvalidCodeword(format!("unknown symbol {:?}", ch)))?;
        symbols.push(pos as u64);
    }

    if symbols.len() <= CHECKSUM_SYMBOLS {
        return Err(PaperbackError::InvalidCodeword("too short".into()));
    }
    let (data, check) = symbols.split_at(symbols.len() - CHECKSUM_SYMBOLS);

    let bytes = Zeroizing::new(
        bits::unpack(data, SYMBOL_BITS)
            .map_err(|e| PaperbackError::InvalidCodeword(e.to_string()))?,
    );
    let check = bits::unpack(check, SYMBOL_BITS)
        .map_err(|e| PaperbackError::InvalidCodeword(e.to_string()))?;

    if bytes.is_empty() {
        return Err(PaperbackError::InvalidCodeword("too short".into()));
    }
    if check[..] != checksum(&bytes)[..] {
        return Err(PaperbackError::InvalidCodeword("checksum mismatch".into()));
    }
    Ok(bytes)
}

impl fmt::Debug for Codeword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Codeword(<{} bytes redacted>)", self.0.len())
    }
}

impl Serialize for Codeword {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Codeword {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = Zeroizing::new(String::deserialize(deserializer)?);
        text.parse().map_err(serde::de::Error::custom)
    }
}
