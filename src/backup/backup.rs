use super::shard::BundledShard;
use crate::config::BackupConfig;
use crate::crypto::Passphrase;
use crate::error::{PaperbackError, Result};
use crate::schema::{DocumentId, EncryptedMaster, ShardPayload};
use crate::shamir;
use tracing::{debug, info};

/// Builds the payloads of one paper backup
///
/// Holds the sealed master document and the passphrase it was sealed with
/// for as long as shards are being produced. The passphrase is wiped when
/// the `Backupper` is dropped.
///
/// ```no_run
/// use paperback::backup::Backupper;
///
/// let backup = Backupper::create(b"This is our secret message.").unwrap();
/// let master = backup.master().clone();
/// let shards = backup.shards(3, 5).unwrap();
/// ```
#[derive(Debug)]
pub struct Backupper {
    master: EncryptedMaster,
    passphrase: Passphrase,
    config: BackupConfig,
}

impl Backupper {
    /// Seal `plaintext` under a fresh passphrase using the default configuration
    pub fn create(plaintext: &[u8]) -> Result<Self> {
        Self::create_with_config(plaintext, BackupConfig::default())
    }

    pub fn create_with_config(plaintext: &[u8], config: BackupConfig) -> Result<Self> {
        config.validate()?;
        if plaintext.is_empty() {
            return Err(PaperbackError::EmptySecret);
        }

        let passphrase = Passphrase::generate(config.passphrase_len)?;
        let master = EncryptedMaster::seal(plaintext, passphrase.as_bytes(), config.compression)?;

        info!(
            document = %master.id(),
            compression = ?config.compression,
            plaintext_len = plaintext.len(),
            sealed_len = master.ciphertext.len(),
            "created backup"
        );
        Ok(Self {
            master,
            passphrase,
            config,
        })
    }

    /// The sealed master document
    pub fn master(&self) -> &EncryptedMaster {
        &self.master
    }

    pub fn document_id(&self) -> DocumentId {
        self.master.id()
    }

    /// Split the passphrase into a (k, n)-threshold scheme and bundle every share
    ///
    /// All-or-nothing: if any shard fails to bundle, no shards are returned.
    /// Each call starts a new sharing generation; shards from different calls
    /// do not combine with each other.
    pub fn shards(&self, k: usize, n: usize) -> Result<Vec<BundledShard>> {
        let document = self.document_id();
        let shares = shamir::split(k, n, self.passphrase.as_bytes())?;

        let bundles = shares
            .into_iter()
            .map(|share| {
                debug!(document = %document, index = share.index(), "bundling shard");
                BundledShard::bundle(&ShardPayload { document, share }, self.config.codeword_len)
            })
            .collect::<Result<Vec<_>>>()?;

        info!(document = %document, k, n, "generated shards");
        Ok(bundles)
    }
}
