use super::shard::BundledShard;
use crate::config::BackupConfig;
use crate::error::{PaperbackError, Result};
use crate::schema::{DocumentId, ShardPayload};
use crate::shamir::{self, Share};
use tracing::{info, warn};

/// Issues new shards for an existing backup from a quorum of old ones
///
/// Needs at least as many shards as the backup's threshold. New shards are
/// interchangeable with the originals: they share the document id, the
/// threshold and the sharing generation. Their indices are drawn at random
/// from those above the original `n` that the supplied shards do not use.
/// The master document is not needed.
#[derive(Debug)]
pub struct Extender {
    document: Option<DocumentId>,
    shares: Vec<Share>,
    codeword_len: usize,
}

impl Default for Extender {
    fn default() -> Self {
        Self::new()
    }
}

impl Extender {
    pub fn new() -> Self {
        Self::with_config(&BackupConfig::default())
    }

    /// Use the codeword length from `config` for the new shards
    pub fn with_config(config: &BackupConfig) -> Self {
        Self {
            document: None,
            shares: Vec::new(),
            codeword_len: config.codeword_len,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shares.len()
    }

    /// Open a shard and keep its share
    ///
    /// All shards must come from the same document and sharing generation.
    pub fn add_shard(&mut self, bundled: &BundledShard) -> Result<()> {
        let ShardPayload { document, share } = bundled.unbundle().inspect_err(|e| {
            warn!("rejected shard: {}", e);
        })?;

        if let Some(expected) = self.document {
            if document != expected {
                return Err(PaperbackError::MismatchedShares(format!(
                    "shard belongs to document {}, extending {}",
                    document, expected
                )));
            }
        }
        if let Some(first) = self.shares.first() {
            if share.generation() != first.generation() {
                return Err(PaperbackError::MismatchedShares(format!(
                    "shard is from generation {}, extending {}",
                    share.generation(),
                    first.generation()
                )));
            }
            if self.shares.iter().any(|s| s.index() == share.index()) {
                return Err(PaperbackError::MismatchedShares(format!(
                    "shard {} has already been added",
                    share.index()
                )));
            }
        }

        self.document = Some(document);
        self.shares.push(share);
        Ok(())
    }

    /// Issue `count` new shards, each under a fresh codeword
    pub fn extend(&self, count: usize) -> Result<Vec<BundledShard>> {
        let document = self.document.ok_or(PaperbackError::InsufficientShares {
            have: 0,
            need: 1,
        })?;

        let shares = shamir::extend_shares(&self.shares, count)?;
        let bundles = shares
            .into_iter()
            .map(|share| BundledShard::bundle(&ShardPayload { document, share }, self.codeword_len))
            .collect::<Result<Vec<_>>>()?;

        info!(document = %document, from = self.shares.len(), count, "extended backup");
        Ok(bundles)
    }
}

/// Issue `count` new shards from `shards` in one step
pub fn extend(shards: &[BundledShard], count: usize) -> Result<Vec<BundledShard>> {
    let mut extender = Extender::new();
    for bundled in shards {
        extender.add_shard(bundled)?;
    }
    extender.extend(count)
}
