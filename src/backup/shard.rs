use crate::crypto::Codeword;
use crate::error::Result;
use crate::schema::{EncryptedShard, ShardPayload};
use serde::{Deserialize, Serialize};

/// A sealed shard together with the codeword that opens it
///
/// This is what one recovery participant holds. It is created once when the
/// backup is made and only ever opened afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundledShard {
    pub shard: EncryptedShard,
    pub codeword: Codeword,
}

impl BundledShard {
    /// Seal a payload under a freshly generated codeword of `codeword_len` bytes
    pub fn bundle(payload: &ShardPayload, codeword_len: usize) -> Result<Self> {
        Self::bundle_with(payload, || Codeword::generate(codeword_len))
    }

    /// Seal a payload under a codeword from `generate`
    pub fn bundle_with<F>(payload: &ShardPayload, generate: F) -> Result<Self>
    where
        F: FnOnce() -> Result<Codeword>,
    {
        let codeword = generate()?;
        let shard = EncryptedShard::seal(payload, &codeword)?;
        Ok(Self { shard, codeword })
    }

    /// Open the shard with its bundled codeword
    ///
    /// A wrong codeword, a corrupted ciphertext or a malformed payload all
    /// fail with `ShardDecryptionFailed`.
    pub fn unbundle(&self) -> Result<ShardPayload> {
        self.shard.open(&self.codeword)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
