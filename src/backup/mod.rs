//! The backup lifecycle: create a sealed master and its shards, recover the
//! document from a quorum of shards, and extend a backup with new shards.

#[allow(clippy::module_inception)]
mod backup;
mod extend;
mod recover;
mod shard;

pub use backup::Backupper;
pub use extend::{extend, Extender};
pub use recover::{RecoveryState, Recoverer};
pub use shard::BundledShard;
