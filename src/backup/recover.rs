use super::shard::BundledShard;
use crate::error::{PaperbackError, Result};
use crate::schema::{DocumentId, EncryptedMaster, ShardPayload};
use crate::shamir::{self, Generation, Share, MIN_COMBINE};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Where a recovery session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryState {
    /// No shards accepted yet
    Empty,
    /// Some shards accepted, fewer than the shards claim are needed
    Collecting,
    /// Enough shards for an attempt, going by the thresholds they claim
    Ready,
    /// The document has been recovered
    Recovered,
}

/// Accumulates shards for one master document and recovers it
///
/// Shards are opened and checked as they are added; a rejected shard leaves
/// the session untouched. The threshold claimed by the shards is only used
/// to report [`RecoveryState::Ready`]. Whether enough shards are present is
/// decided by the master document itself: [`Recoverer::recover`] succeeds
/// only if the reconstructed passphrase authenticates it.
pub struct Recoverer {
    master: EncryptedMaster,
    document: DocumentId,
    shares: Vec<Share>,
    recovered: Option<Zeroizing<Vec<u8>>>,
}

impl Recoverer {
    pub fn new(master: EncryptedMaster) -> Self {
        let document = master.id();
        Self {
            master,
            document,
            shares: Vec::new(),
            recovered: None,
        }
    }

    pub fn document_id(&self) -> DocumentId {
        self.document
    }

    pub fn shard_count(&self) -> usize {
        self.shares.len()
    }

    pub fn state(&self) -> RecoveryState {
        if self.recovered.is_some() {
            return RecoveryState::Recovered;
        }
        if self.shares.is_empty() {
            return RecoveryState::Empty;
        }

        let claimed = self
            .shares
            .iter()
            .map(|s| s.threshold() as usize)
            .max()
            .unwrap_or(MIN_COMBINE);
        if self.shares.len() >= claimed.max(MIN_COMBINE) {
            RecoveryState::Ready
        } else {
            RecoveryState::Collecting
        }
    }

    /// Open a shard and add its share to the session
    ///
    /// Fails with `ShardDecryptionFailed` if the codeword does not open the
    /// shard, and with `MismatchedShares` if the shard belongs to another
    /// document or repeats an index already held.
    pub fn add_shard(&mut self, bundled: &BundledShard) -> Result<()> {
        let payload = bundled.unbundle().inspect_err(|e| {
            warn!(document = %self.document, "rejected shard: {}", e);
        })?;
        let ShardPayload { document, share } = payload;

        if document != self.document {
            warn!(document = %self.document, shard_document = %document, "rejected shard from another document");
            return Err(PaperbackError::MismatchedShares(format!(
                "shard belongs to document {}, recovering {}",
                document, self.document
            )));
        }
        if self
            .shares
            .iter()
            .any(|s| s.generation() == share.generation() && s.index() == share.index())
        {
            warn!(document = %self.document, index = share.index(), "rejected duplicate shard");
            return Err(PaperbackError::MismatchedShares(format!(
                "shard {} has already been added",
                share.index()
            )));
        }

        debug!(
            document = %self.document,
            index = share.index(),
            generation = %share.generation(),
            "accepted shard"
        );
        self.shares.push(share);
        Ok(())
    }

    /// Reconstruct the passphrase and open the master document
    ///
    /// Shares are combined per generation, largest group first. Fails with
    /// `InsufficientShares` when no generation has two shares, and with
    /// `MasterDecryptionFailed` when no combination opens the master (too
    /// few shards for the real threshold, or tampered shares). Either way
    /// more shards can be added and `recover` tried again.
    pub fn recover(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        if let Some(document) = &self.recovered {
            return Ok(document.clone());
        }

        let groups = self.groups();
        let largest = groups.first().map(Vec::len).unwrap_or(0);
        if largest < MIN_COMBINE {
            return Err(PaperbackError::InsufficientShares {
                have: largest,
                need: MIN_COMBINE,
            });
        }

        let mut failure = PaperbackError::MasterDecryptionFailed;
        for group in groups.iter().filter(|g| g.len() >= MIN_COMBINE) {
            let passphrase = match shamir::combine(group) {
                Ok(passphrase) => passphrase,
                Err(e) => {
                    warn!(document = %self.document, "skipping inconsistent shares: {}", e);
                    failure = e;
                    continue;
                }
            };

            match self.master.open(&passphrase) {
                Ok(document) => {
                    info!(document = %self.document, shards = group.len(), "recovered document");
                    self.recovered = Some(document.clone());
                    return Ok(document);
                }
                Err(PaperbackError::MasterDecryptionFailed) => {
                    debug!(
                        document = %self.document,
                        shards = group.len(),
                        generation = %group[0].generation(),
                        "passphrase candidate rejected"
                    );
                    failure = PaperbackError::MasterDecryptionFailed;
                }
                Err(e) => return Err(e),
            }
        }
        Err(failure)
    }

    /// Accepted shares split by generation, largest group first
    fn groups(&self) -> Vec<Vec<Share>> {
        let mut by_generation: HashMap<Generation, Vec<Share>> = HashMap::new();
        for share in &self.shares {
            by_generation
                .entry(share.generation())
                .or_default()
                .push(share.clone());
        }

        let mut groups: Vec<Vec<Share>> = by_generation.into_values().collect();
        groups.sort_by(|a, b| b.len().cmp(&a.len()));
        groups
    }
}

impl std::fmt::Debug for Recoverer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recoverer")
            .field("document", &self.document)
            .field("shards", &self.shares.len())
            .field("state", &self.state())
            .finish()
    }
}
