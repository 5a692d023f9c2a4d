//! Paperback - Threshold-Shared Paper Backups
//!
//! A document is sealed under a random passphrase. The passphrase is split
//! with Shamir's secret sharing over GF(256) into `n` shares, any `k` of
//! which reconstruct it. Each share is sealed under its own random
//! codeword, and the sealed share plus its codeword form one shard that a
//! single participant keeps.
//!
//! ## Lifecycle
//!
//! ```text
//! Create:  Document → Compress → Seal(passphrase) → EncryptedMaster
//!          Passphrase → Split(k, n) → Seal(codeword) → BundledShard × n
//!
//! Recover: BundledShard → Open(codeword) → AddShard → ... → Combine → Open(master)
//!
//! Extend:  BundledShard × k → Rebuild polynomials → BundledShard × count
//! ```
//!
//! - **Compress**: zstd (default), lz4, brotli, or none
//! - **Seal**: AES-256-GCM with a BLAKE3-derived key
//! - **Split / Combine**: per-byte polynomials over GF(2^8), Lagrange at x = 0
//! - **Codewords**: random bytes written as checksummed z-base-32
//!
//! ## Example
//!
//! ```no_run
//! use paperback::{Backupper, Recoverer};
//!
//! let backup = Backupper::create(b"this is a secret which is a bit larger").unwrap();
//! let shards = backup.shards(3, 6).unwrap();
//!
//! let mut recoverer = Recoverer::new(backup.master().clone());
//! for shard in &shards[..3] {
//!     recoverer.add_shard(shard).unwrap();
//! }
//! let document = recoverer.recover().unwrap();
//! assert_eq!(&document[..], b"this is a secret which is a bit larger");
//! ```

pub mod backup;
pub mod bits;
pub mod config;
pub mod crypto;
pub mod error;
pub mod schema;
pub mod shamir;

pub use backup::{extend, Backupper, BundledShard, Extender, RecoveryState, Recoverer};
pub use config::{BackupConfig, Compression};
pub use error::{PaperbackError, Result};
pub use schema::{DocumentId, EncryptedMaster, EncryptedShard};
