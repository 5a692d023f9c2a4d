//! Values that leave this crate: the sealed master document and sealed
//! shards, plus the identifiers tying them together.

use crate::config::Compression;
use crate::crypto::{self, Codeword, KeyPurpose};
use crate::error::{PaperbackError, Result};
use crate::shamir::Share;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

/// Current payload format version
pub const FORMAT_VERSION: u32 = 1;

fn check_version(version: u32) -> Result<()> {
    if version != FORMAT_VERSION {
        return Err(PaperbackError::InvalidFormat(format!(
            "Unsupported format version {}",
            version
        )));
    }
    Ok(())
}

/// Short identifier of one backup, derived from its sealed master
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId([u8; DocumentId::SIZE]);

impl DocumentId {
    pub const SIZE: usize = 8;

    /// BLAKE3 of the master ciphertext, truncated
    pub fn of(ciphertext: &[u8]) -> Self {
        let hash = blake3::hash(ciphertext);
        let mut id = [0u8; Self::SIZE];
        id.copy_from_slice(&hash.as_bytes()[..Self::SIZE]);
        Self(id)
    }

    pub fn from_bytes(bytes: [u8; Self::SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::SIZE] {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self)
    }
}

impl std::str::FromStr for DocumentId {
    type Err = PaperbackError;
    fn from_str(s: &str) -> Result<Self> {
        let mut id = [0u8; Self::SIZE];
        hex::decode_to_slice(s, &mut id)
            .map_err(|e| PaperbackError::InvalidFormat(format!("document id: {}", e)))?;
        Ok(Self(id))
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// The document plaintext, compressed and sealed under the passphrase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedMaster {
    pub version: u32,
    pub compression: Compression,
    /// nonce || ciphertext || tag
    #[serde(with = "hex")]
    pub ciphertext: Vec<u8>,
}

impl EncryptedMaster {
    pub(crate) fn seal(plaintext: &[u8], passphrase: &[u8], compression: Compression) -> Result<Self> {
        let compressed = crypto::compress(plaintext, compression)?;
        let aad = Self::associated_data(FORMAT_VERSION, compression);
        let ciphertext = crypto::seal(passphrase, KeyPurpose::Master, &aad, &compressed)?;
        Ok(Self {
            version: FORMAT_VERSION,
            compression,
            ciphertext,
        })
    }

    /// Unseal with a candidate passphrase
    ///
    /// Authentication failure is `MasterDecryptionFailed`: the candidate is
    /// not the passphrase this master was sealed under.
    pub(crate) fn open(&self, passphrase: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        check_version(self.version)?;
        let aad = Self::associated_data(self.version, self.compression);
        let compressed = crypto::open(passphrase, KeyPurpose::Master, &aad, &self.ciphertext)
            .ok_or(PaperbackError::MasterDecryptionFailed)?;
        crypto::decompress(&compressed, self.compression)
    }

    /// Header fields the ciphertext is bound to
    fn associated_data(version: u32, compression: Compression) -> [u8; 5] {
        let mut aad = [0u8; 5];
        aad[..4].copy_from_slice(&version.to_le_bytes());
        aad[4] = compression.tag();
        aad
    }

    pub fn id(&self) -> DocumentId {
        DocumentId::of(&self.ciphertext)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let master: Self = serde_json::from_str(json)?;
        check_version(master.version)?;
        Ok(master)
    }
}

/// What a shard decrypts to: the share plus the backup it belongs to
///
/// Layout: `document(8) || share`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardPayload {
    pub document: DocumentId,
    pub share: Share,
}

impl ShardPayload {
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        let share = Zeroizing::new(self.share.to_bytes());
        let mut buf = Zeroizing::new(Vec::with_capacity(DocumentId::SIZE + share.len()));
        buf.extend_from_slice(self.document.as_bytes());
        buf.extend_from_slice(&share);
        buf
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < DocumentId::SIZE {
            return Err(PaperbackError::InvalidFormat("Shard payload too short".into()));
        }
        let mut id = [0u8; DocumentId::SIZE];
        id.copy_from_slice(&data[..DocumentId::SIZE]);
        Ok(Self {
            document: DocumentId::from_bytes(id),
            share: Share::from_bytes(&data[DocumentId::SIZE..])?,
        })
    }
}

/// A shard payload sealed under its codeword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedShard {
    pub version: u32,
    /// nonce || ciphertext || tag
    #[serde(with = "hex")]
    pub ciphertext: Vec<u8>,
}

impl EncryptedShard {
    pub(crate) fn seal(payload: &ShardPayload, codeword: &Codeword) -> Result<Self> {
        let plaintext = payload.to_bytes();
        let aad = FORMAT_VERSION.to_le_bytes();
        let ciphertext = crypto::seal(codeword.as_bytes(), KeyPurpose::Shard, &aad, &plaintext)?;
        Ok(Self {
            version: FORMAT_VERSION,
            ciphertext,
        })
    }

    /// Unseal and parse; any failure is `ShardDecryptionFailed`
    pub(crate) fn open(&self, codeword: &Codeword) -> Result<ShardPayload> {
        if self.version != FORMAT_VERSION {
            return Err(PaperbackError::ShardDecryptionFailed);
        }
        let aad = self.version.to_le_bytes();
        let plaintext = crypto::open(codeword.as_bytes(), KeyPurpose::Shard, &aad, &self.ciphertext)
            .ok_or(PaperbackError::ShardDecryptionFailed)?;
        ShardPayload::from_bytes(&plaintext).map_err(|_| PaperbackError::ShardDecryptionFailed)
    }

    /// Hand-transcribable form of the ciphertext (checksummed z-base-32)
    pub fn to_text(&self) -> String {
        crypto::phrase::encode_text(&self.ciphertext).as_str().to_owned()
    }

    pub fn from_text(text: &str) -> Result<Self> {
        let ciphertext = crypto::phrase::decode_text(text)
            .map_err(|e| PaperbackError::InvalidFormat(format!("shard text: {}", e)))?;
        Ok(Self {
            version: FORMAT_VERSION,
            ciphertext: ciphertext.to_vec(),
        })
    }
}
